//! Order fixtures.
//!
//! `sample_message(uid)` is the wire payload that normalizes to
//! `sample_order(uid)`.

use chrono::{TimeZone, Utc};
use orderflow_core::order::{Delivery, Item, Order, Payment};
use serde_json::{Value, json};

/// An order with a delivery block, a payment and two items.
///
/// # Panics
///
/// Never in practice; the fixed creation timestamp is valid.
#[must_use]
pub fn sample_order(order_uid: &str) -> Order {
    Order {
        order_uid: order_uid.to_owned(),
        track_number: "WBILMTESTTRACK".to_owned(),
        entry: "WBIL".to_owned(),
        delivery: Delivery {
            name: "Test Testov".to_owned(),
            phone: "+9720000000".to_owned(),
            zip: "2639809".to_owned(),
            city: "Kiryat Mozkin".to_owned(),
            address: "Ploshad Mira 15".to_owned(),
            region: "Kraiot".to_owned(),
            email: "test@gmail.com".to_owned(),
        },
        payment: Payment {
            transaction: order_uid.to_owned(),
            request_id: String::new(),
            currency: "USD".to_owned(),
            provider: "wbpay".to_owned(),
            amount: 1817,
            payment_dt: 1_637_907_727,
            bank: "alpha".to_owned(),
            delivery_cost: 1500,
            goods_total: 317,
            custom_fee: 0,
        },
        items: vec![
            Item {
                chrt_id: 9_934_930,
                track_number: "WBILMTESTTRACK".to_owned(),
                price: 453,
                rid: "ab4219087a764ae0btest".to_owned(),
                name: "Mascaras".to_owned(),
                sale: 30,
                size: "0".to_owned(),
                total_price: 317,
                nm_id: 2_389_212,
                brand: "Vivienne Sabo".to_owned(),
                status: 202,
            },
            Item {
                chrt_id: 9_934_931,
                track_number: "WBILMTESTTRACK".to_owned(),
                price: 120,
                rid: "ab4219087a764ae0btest2".to_owned(),
                name: "Lipstick".to_owned(),
                sale: 0,
                size: "1".to_owned(),
                total_price: 120,
                nm_id: 2_389_213,
                brand: "Vivienne Sabo".to_owned(),
                status: 202,
            },
        ],
        locale: "en".to_owned(),
        internal_signature: String::new(),
        customer_id: "test".to_owned(),
        delivery_service: "meest".to_owned(),
        shardkey: "9".to_owned(),
        sm_id: 99,
        date_created: Utc.with_ymd_and_hms(2021, 11, 26, 6, 22, 19).unwrap(),
        oof_shard: "1".to_owned(),
    }
}

/// The inbound payload for `sample_order(order_uid)`.
#[must_use]
pub fn sample_message(order_uid: &str) -> Value {
    json!({
        "order_uid": order_uid,
        "track_number": "WBILMTESTTRACK",
        "entry": "WBIL",
        "delivery": {
            "name": "Test Testov",
            "phone": "+9720000000",
            "zip": "2639809",
            "city": "Kiryat Mozkin",
            "address": "Ploshad Mira 15",
            "region": "Kraiot",
            "email": "test@gmail.com"
        },
        "payment": {
            "transaction": order_uid,
            "request_id": "",
            "currency": "USD",
            "provider": "wbpay",
            "amount": 1817,
            "payment_dt": 1_637_907_727,
            "bank": "alpha",
            "delivery_cost": 1500,
            "goods_total": 317,
            "custom_fee": 0
        },
        "items": [
            {
                "chrt_id": 9_934_930,
                "track_number": "WBILMTESTTRACK",
                "price": 453,
                "rid": "ab4219087a764ae0btest",
                "name": "Mascaras",
                "sale": 30,
                "size": "0",
                "total_price": 317,
                "nm_id": 2_389_212,
                "brand": "Vivienne Sabo",
                "status": 202
            },
            {
                "chrt_id": 9_934_931,
                "track_number": "WBILMTESTTRACK",
                "price": 120,
                "rid": "ab4219087a764ae0btest2",
                "name": "Lipstick",
                "sale": 0,
                "size": "1",
                "total_price": 120,
                "nm_id": 2_389_213,
                "brand": "Vivienne Sabo",
                "status": 202
            }
        ],
        "locale": "en",
        "internal_signature": "",
        "customer_id": "test",
        "delivery_service": "meest",
        "shardkey": "9",
        "sm_id": 99,
        "date_created": "2021-11-26T06:22:19Z",
        "oof_shard": "1"
    })
}

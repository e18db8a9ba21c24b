//! The order aggregate.
//!
//! An [`Order`] owns exactly one [`Delivery`], exactly one [`Payment`] and zero
//! or more [`Item`]s. The four parts are persisted, cached and served as a
//! single unit keyed by [`Order::order_uid`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate root: an order together with its delivery, payment and items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Globally unique order identifier; the key of every sub-record.
    pub order_uid: String,
    /// Shipment track number.
    pub track_number: String,
    /// Entry channel the order arrived through.
    pub entry: String,
    /// Delivery recipient.
    pub delivery: Delivery,
    /// Payment details.
    pub payment: Payment,
    /// Line items, in arrival order.
    pub items: Vec<Item>,
    /// Customer locale.
    pub locale: String,
    /// Internal signature.
    pub internal_signature: String,
    /// Customer identifier.
    pub customer_id: String,
    /// Name of the delivery service.
    pub delivery_service: String,
    /// Shard key.
    pub shardkey: String,
    /// Shard-manager identifier.
    pub sm_id: i64,
    /// Creation timestamp.
    pub date_created: DateTime<Utc>,
    /// Out-of-shard flag.
    pub oof_shard: String,
}

/// Delivery recipient of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Payment attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub transaction: String,
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: i64,
    /// Payment time as a Unix timestamp.
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

/// A line item. Has no identity outside its order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub chrt_id: i64,
    pub track_number: String,
    pub price: i64,
    pub rid: String,
    pub name: String,
    /// Sale percentage.
    pub sale: i32,
    pub size: String,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i64,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn order_with_two_items() -> Order {
        Order {
            order_uid: "b563feb7b2b84b6test".to_owned(),
            track_number: "WBILMTESTTRACK".to_owned(),
            entry: "WBIL".to_owned(),
            delivery: Delivery {
                city: "Kiryat Mozkin".to_owned(),
                ..Delivery::default()
            },
            payment: Payment {
                amount: 1817,
                ..Payment::default()
            },
            items: vec![Item::default(), Item::default()],
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

    #[test]
    fn test_order_serializes_with_payload_field_names() {
        // Arrange
        let order = order_with_two_items();

        // Act
        let json = serde_json::to_value(&order).unwrap();

        // Assert
        assert_eq!(json["order_uid"], "b563feb7b2b84b6test");
        assert_eq!(json["delivery"]["city"], "Kiryat Mozkin");
        assert_eq!(json["payment"]["amount"], 1817);
        assert_eq!(json["items"].as_array().unwrap().len(), 2);
        assert_eq!(json["date_created"], "2021-11-26T06:22:19Z");
    }

    #[test]
    fn test_order_clone_is_structurally_equal() {
        let order = order_with_two_items();
        let mut other = order.clone();
        assert_eq!(order, other);

        other.items.pop();
        assert_ne!(order, other);
    }
}

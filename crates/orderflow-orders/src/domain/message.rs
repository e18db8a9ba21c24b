//! Inbound order message schema.
//!
//! Decoding is lenient about absent fields: anything missing or `null` takes
//! its zero value (empty string, `0`, empty list). Type mismatches and
//! non-object payloads still fail.

use serde::{Deserialize, Deserializer};

/// Decodes `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decodes `null` as an empty list and `null` elements as default items.
fn null_items_as_default<'de, D>(deserializer: D) -> Result<Vec<ItemMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = Option::<Vec<Option<ItemMessage>>>::deserialize(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect())
}

/// An order as published on the bus.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderMessage {
    #[serde(deserialize_with = "null_as_default")]
    pub order_uid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub track_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub entry: String,
    #[serde(deserialize_with = "null_as_default")]
    pub delivery: DeliveryMessage,
    #[serde(deserialize_with = "null_as_default")]
    pub payment: PaymentMessage,
    #[serde(deserialize_with = "null_items_as_default")]
    pub items: Vec<ItemMessage>,
    #[serde(deserialize_with = "null_as_default")]
    pub locale: String,
    #[serde(deserialize_with = "null_as_default")]
    pub internal_signature: String,
    #[serde(deserialize_with = "null_as_default")]
    pub customer_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub delivery_service: String,
    #[serde(deserialize_with = "null_as_default")]
    pub shardkey: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sm_id: i64,
    /// Creation time as `YYYY-MM-DDTHH:MM:SSZ`.
    #[serde(deserialize_with = "null_as_default")]
    pub date_created: String,
    #[serde(deserialize_with = "null_as_default")]
    pub oof_shard: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeliveryMessage {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub phone: String,
    #[serde(deserialize_with = "null_as_default")]
    pub zip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub city: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(deserialize_with = "null_as_default")]
    pub email: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PaymentMessage {
    #[serde(deserialize_with = "null_as_default")]
    pub transaction: String,
    #[serde(deserialize_with = "null_as_default")]
    pub request_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub currency: String,
    #[serde(deserialize_with = "null_as_default")]
    pub provider: String,
    #[serde(deserialize_with = "null_as_default")]
    pub amount: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub payment_dt: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub bank: String,
    #[serde(deserialize_with = "null_as_default")]
    pub delivery_cost: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub goods_total: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub custom_fee: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ItemMessage {
    #[serde(deserialize_with = "null_as_default")]
    pub chrt_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub track_number: String,
    #[serde(deserialize_with = "null_as_default")]
    pub price: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub rid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub sale: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub size: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_price: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub nm_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub brand: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: i64,
}

//! Message → aggregate normalization.

use chrono::{DateTime, NaiveDateTime, Utc};
use orderflow_core::order::{Delivery, Item, Order, Payment};
use thiserror::Error;
use tracing::warn;

use super::message::{ItemMessage, OrderMessage};

/// `strftime` form of `YYYY-MM-DDTHH:MM:SSZ`.
pub const DATE_CREATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// What to do with a `date_created` that is present but does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimestampPolicy {
    /// Report the failure and keep the order, stamped with the Unix epoch.
    #[default]
    Lenient,
    /// Drop the message, as for an empty `date_created`.
    Strict,
}

impl TimestampPolicy {
    /// `Strict` when `strict` is set, `Lenient` otherwise.
    #[must_use]
    pub fn from_strict(strict: bool) -> Self {
        if strict { Self::Strict } else { Self::Lenient }
    }
}

/// Why a message was dropped.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// The payload is not a JSON order object.
    #[error("malformed order message: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `date_created` is absent or empty.
    #[error("order message has an empty date_created")]
    MissingDateCreated,

    /// `date_created` is not `YYYY-MM-DDTHH:MM:SSZ` and the policy is strict.
    #[error("order message date_created {value:?} is not YYYY-MM-DDTHH:MM:SSZ: {source}")]
    InvalidDateCreated {
        /// The rejected value.
        value: String,
        /// The parser's complaint.
        source: chrono::ParseError,
    },
}

/// Parses `payload` into an order aggregate.
///
/// # Errors
///
/// Returns `NormalizeError` when the message must be dropped: the payload
/// does not decode, `date_created` is empty, or `date_created` does not parse
/// under `TimestampPolicy::Strict`.
pub fn normalize(payload: &[u8], policy: TimestampPolicy) -> Result<Order, NormalizeError> {
    let message: OrderMessage = serde_json::from_slice(payload)?;
    if message.date_created.is_empty() {
        return Err(NormalizeError::MissingDateCreated);
    }

    let date_created = match parse_date_created(&message.date_created) {
        Ok(parsed) => parsed,
        Err(source) => match policy {
            TimestampPolicy::Strict => {
                return Err(NormalizeError::InvalidDateCreated {
                    value: message.date_created,
                    source,
                });
            }
            TimestampPolicy::Lenient => {
                warn!(
                    order_uid = %message.order_uid,
                    date_created = %message.date_created,
                    error = %source,
                    "unparseable date_created, storing Unix epoch"
                );
                DateTime::<Utc>::UNIX_EPOCH
            }
        },
    };

    Ok(into_order(message, date_created))
}

fn parse_date_created(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, DATE_CREATED_FORMAT).map(|naive| naive.and_utc())
}

fn into_order(message: OrderMessage, date_created: DateTime<Utc>) -> Order {
    let delivery = message.delivery;
    let payment = message.payment;
    Order {
        order_uid: message.order_uid,
        track_number: message.track_number,
        entry: message.entry,
        delivery: Delivery {
            name: delivery.name,
            phone: delivery.phone,
            zip: delivery.zip,
            city: delivery.city,
            address: delivery.address,
            region: delivery.region,
            email: delivery.email,
        },
        payment: Payment {
            transaction: payment.transaction,
            request_id: payment.request_id,
            currency: payment.currency,
            provider: payment.provider,
            amount: payment.amount,
            payment_dt: payment.payment_dt,
            bank: payment.bank,
            delivery_cost: payment.delivery_cost,
            goods_total: payment.goods_total,
            custom_fee: payment.custom_fee,
        },
        items: message.items.into_iter().map(into_item).collect(),
        locale: message.locale,
        internal_signature: message.internal_signature,
        customer_id: message.customer_id,
        delivery_service: message.delivery_service,
        shardkey: message.shardkey,
        sm_id: message.sm_id,
        date_created,
        oof_shard: message.oof_shard,
    }
}

fn into_item(item: ItemMessage) -> Item {
    Item {
        chrt_id: item.chrt_id,
        track_number: item.track_number,
        price: item.price,
        rid: item.rid,
        name: item.name,
        sale: item.sale,
        size: item.size,
        total_price: item.total_price,
        nm_id: item.nm_id,
        brand: item.brand,
        status: item.status,
    }
}

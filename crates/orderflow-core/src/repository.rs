//! Persistence and capability traits.
//!
//! [`OrderRepository`] is the durable backend. [`OrderSaver`] and
//! [`OrderProvider`] are the narrow write and read capabilities handed to the
//! ingestion path and the HTTP layer, so either side can be tested against a
//! double that implements only what it needs.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::order::Order;

/// Durable storage for order aggregates.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Write the order, its delivery, its payment and all of its items as one
    /// atomic unit, replacing any aggregate already stored under the same UID.
    async fn save_order(&self, order: &Order) -> Result<(), DomainError>;

    /// Load every stored aggregate, items included. Any failure aborts the
    /// whole load; no partial result is returned.
    async fn load_orders(&self) -> Result<Vec<Order>, DomainError>;
}

/// Write capability: accept a normalized order.
#[async_trait]
pub trait OrderSaver: Send + Sync {
    /// Persist the order. The order is only visible to readers once this
    /// returns `Ok`.
    async fn save_order(&self, order: Order) -> Result<(), DomainError>;
}

/// Read capability: look up an order by UID.
#[async_trait]
pub trait OrderProvider: Send + Sync {
    /// Returns the order for `order_uid`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::OrderNotFound` when no such order is available.
    async fn order(&self, order_uid: &str) -> Result<Order, DomainError>;
}

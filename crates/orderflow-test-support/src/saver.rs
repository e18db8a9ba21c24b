//! Test savers: `OrderSaver` doubles for the ingestion path.

use std::sync::Mutex;

use async_trait::async_trait;
use orderflow_core::error::DomainError;
use orderflow_core::order::Order;
use orderflow_core::repository::OrderSaver;

/// A saver that records every order handed to it and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingOrderSaver {
    saved: Mutex<Vec<Order>>,
}

impl RecordingOrderSaver {
    /// Create a saver with nothing recorded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all orders that were saved.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn saved_orders(&self) -> Vec<Order> {
        self.saved.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderSaver for RecordingOrderSaver {
    async fn save_order(&self, order: Order) -> Result<(), DomainError> {
        self.saved.lock().unwrap().push(order);
        Ok(())
    }
}

/// A saver that always returns an infrastructure error.
#[derive(Debug)]
pub struct FailingOrderSaver;

#[async_trait]
impl OrderSaver for FailingOrderSaver {
    async fn save_order(&self, _order: Order) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

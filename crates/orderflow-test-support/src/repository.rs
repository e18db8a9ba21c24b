//! Test repositories: `OrderRepository` doubles.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use orderflow_core::error::DomainError;
use orderflow_core::order::Order;
use orderflow_core::repository::OrderRepository;

/// A repository that keeps aggregates in memory, keyed by UID. Stands in for
/// the relational backend: a save replaces the whole aggregate and survives
/// for as long as the repository does, so it can model a process restart by
/// being shared between two stores.
#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<BTreeMap<String, Order>>,
    saves: Mutex<usize>,
}

impl InMemoryOrderRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository already holding `orders`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn with_orders(orders: Vec<Order>) -> Self {
        let repo = Self::new();
        {
            let mut stored = repo.orders.lock().unwrap();
            for order in orders {
                stored.insert(order.order_uid.clone(), order);
            }
        }
        repo
    }

    /// Returns the stored aggregate for `order_uid`, bypassing any cache.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn stored(&self, order_uid: &str) -> Option<Order> {
        self.orders.lock().unwrap().get(order_uid).cloned()
    }

    /// Number of successful `save_order` calls.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save_order(&self, order: &Order) -> Result<(), DomainError> {
        self.orders
            .lock()
            .unwrap()
            .insert(order.order_uid.clone(), order.clone());
        *self.saves.lock().unwrap() += 1;
        Ok(())
    }

    async fn load_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.lock().unwrap().values().cloned().collect())
    }
}

/// A repository that always returns an infrastructure error. Useful for
/// testing persist and hydration failure paths.
#[derive(Debug)]
pub struct FailingOrderRepository;

#[async_trait]
impl OrderRepository for FailingOrderRepository {
    async fn save_order(&self, _order: &Order) -> Result<(), DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn load_orders(&self) -> Result<Vec<Order>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}

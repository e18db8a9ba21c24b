//! Write-through aggregate store.
//!
//! Every successful [`AggregateStore::persist`] is followed by a cache write;
//! a failed persist never touches the cache. Reads go to the cache only. An
//! aggregate that is committed but not cached (hydration not yet run, or a
//! process that died between commit and cache write) stays unreachable
//! through [`OrderProvider`] until it is written again or the cache is
//! rehydrated.

use std::sync::Arc;

use async_trait::async_trait;
use orderflow_core::error::DomainError;
use orderflow_core::order::Order;
use orderflow_core::repository::{OrderProvider, OrderRepository, OrderSaver};
use tracing::{error, info, instrument};

use crate::cache::OrderCache;

/// Durable backend plus the cache it keeps in sync.
#[derive(Clone)]
pub struct AggregateStore {
    repository: Arc<dyn OrderRepository>,
    cache: Arc<OrderCache>,
}

impl std::fmt::Debug for AggregateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateStore")
            .field("cached_orders", &self.cache.len())
            .field("warm", &self.cache.is_warm())
            .finish_non_exhaustive()
    }
}

impl AggregateStore {
    /// Creates a store over `repository` that maintains `cache`.
    #[must_use]
    pub fn new(repository: Arc<dyn OrderRepository>, cache: Arc<OrderCache>) -> Self {
        Self { repository, cache }
    }

    /// The cache this store writes through to.
    #[must_use]
    pub fn cache(&self) -> &Arc<OrderCache> {
        &self.cache
    }

    /// Persists the aggregate, then caches it.
    ///
    /// # Errors
    ///
    /// Returns the backend's `DomainError` if the write did not commit. The
    /// cache is left unchanged in that case.
    #[instrument(skip(self, order), fields(order_uid = %order.order_uid, items = order.items.len()))]
    pub async fn persist(&self, order: Order) -> Result<(), DomainError> {
        if let Err(e) = self.repository.save_order(&order).await {
            error!(error = %e, "order persist failed, cache left unchanged");
            return Err(e);
        }
        self.cache.set(order);
        info!("order persisted and cached");
        Ok(())
    }

    /// Reads every stored aggregate from the backend.
    ///
    /// # Errors
    ///
    /// Returns the backend's `DomainError`; no partial result is returned.
    pub async fn load_all(&self) -> Result<Vec<Order>, DomainError> {
        self.repository.load_orders().await
    }

    /// Fills the cache from the backend and marks it warm. Returns the number
    /// of aggregates loaded.
    ///
    /// Meant to run once at startup, before the message consumer starts. If
    /// persists run concurrently anyway, entries they have already cached are
    /// kept rather than replaced with the loaded snapshot.
    ///
    /// # Errors
    ///
    /// Returns the backend's `DomainError` if the load fails. Nothing is
    /// inserted and the cache stays cold.
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> Result<usize, DomainError> {
        let orders = self.load_all().await?;
        let count = orders.len();
        for order in orders {
            self.cache.set_if_absent(order);
        }
        self.cache.mark_warm();
        info!(count, "order cache hydrated");
        Ok(count)
    }
}

#[async_trait]
impl OrderSaver for AggregateStore {
    async fn save_order(&self, order: Order) -> Result<(), DomainError> {
        self.persist(order).await
    }
}

#[async_trait]
impl OrderProvider for AggregateStore {
    async fn order(&self, order_uid: &str) -> Result<Order, DomainError> {
        self.cache
            .get(order_uid)
            .map(|order| (*order).clone())
            .ok_or_else(|| DomainError::OrderNotFound(order_uid.to_owned()))
    }
}

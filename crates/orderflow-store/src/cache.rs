//! In-process order cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use orderflow_core::order::Order;

/// Process-wide map from order UID to the last committed aggregate.
///
/// Entries never expire and are never evicted. The map is sharded, so
/// concurrent `get`/`set` calls on any keys are safe and never block on I/O.
#[derive(Debug, Default)]
pub struct OrderCache {
    entries: DashMap<String, Arc<Order>>,
    warm: AtomicBool,
}

impl OrderCache {
    /// Creates an empty, cold cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached aggregate for `order_uid`, if any.
    #[must_use]
    pub fn get(&self, order_uid: &str) -> Option<Arc<Order>> {
        self.entries
            .get(order_uid)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Stores `order` under its own UID, replacing any previous entry.
    pub fn set(&self, order: Order) {
        self.entries
            .insert(order.order_uid.clone(), Arc::new(order));
    }

    /// Stores `order` only if its UID is not cached yet. Returns `true` if it
    /// was inserted.
    pub fn set_if_absent(&self, order: Order) -> bool {
        match self.entries.entry(order.order_uid.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(order));
                true
            }
        }
    }

    /// Number of cached aggregates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drops every entry and marks the cache cold.
    pub fn clear(&self) {
        self.entries.clear();
        self.warm.store(false, Ordering::Release);
    }

    /// Returns `true` once a hydration has completed.
    #[must_use]
    pub fn is_warm(&self) -> bool {
        self.warm.load(Ordering::Acquire)
    }

    pub(crate) fn mark_warm(&self) {
        self.warm.store(true, Ordering::Release);
    }
}

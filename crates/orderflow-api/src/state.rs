//! Shared application state.

use std::sync::Arc;

use orderflow_core::repository::OrderProvider;
use orderflow_store::cache::OrderCache;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Read capability used by the lookup endpoint.
    pub order_provider: Arc<dyn OrderProvider>,
    /// The order cache, for readiness reporting.
    pub cache: Arc<OrderCache>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(order_provider: Arc<dyn OrderProvider>, cache: Arc<OrderCache>) -> Self {
        Self {
            order_provider,
            cache,
        }
    }
}

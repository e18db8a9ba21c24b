//! Query handlers for order lookup.

use orderflow_core::error::DomainError;
use orderflow_core::order::Order;
use orderflow_core::repository::OrderProvider;
use tracing::{debug, instrument};

/// Retrieves an order by its UID.
///
/// # Errors
///
/// Returns `DomainError::OrderNotFound` if the provider has no such order.
#[instrument(skip(provider))]
pub async fn get_order_by_uid(
    order_uid: &str,
    provider: &dyn OrderProvider,
) -> Result<Order, DomainError> {
    debug!("getting order information");
    provider.order(order_uid).await
}

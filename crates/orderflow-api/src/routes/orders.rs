//! Order lookup route.
//!
//! Served from the cache only. An order that is stored but not cached (for
//! example, before startup hydration finishes) answers 404.

use axum::extract::{Path, State};
use axum::{Json, Router, routing::get};
use orderflow_core::order::Order;
use orderflow_orders::application::query_handlers;
use tracing::instrument;

use crate::error::ApiError;
use crate::state::AppState;

/// GET /{order_uid}
#[instrument(skip(state))]
async fn get_order(
    State(state): State<AppState>,
    Path(order_uid): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order = query_handlers::get_order_by_uid(&order_uid, &*state.order_provider).await?;
    Ok(Json(order))
}

/// Returns the router for order lookups.
pub fn router() -> Router<AppState> {
    Router::new().route("/{order_uid}", get(get_order))
}

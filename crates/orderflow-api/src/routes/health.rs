//! Health and readiness endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// Readiness response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    /// `ready` once the cache has been hydrated, `cold` otherwise.
    pub status: &'static str,
    /// Number of orders currently cached.
    pub cached_orders: usize,
}

/// GET /health
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /ready
///
/// Reports whether startup hydration completed. Lookups are served either
/// way; a cold cache just misses.
async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let cached_orders = state.cache.len();
    if state.cache.is_warm() {
        (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: "ready",
                cached_orders,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "cold",
                cached_orders,
            }),
        )
    }
}

/// Returns the health check router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
}

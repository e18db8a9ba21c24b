//! Orderflow API: HTTP lookup server and message consumer.

pub mod config;
pub mod error;
pub mod ingest;
pub mod routes;
pub mod state;
pub mod telemetry;

use std::time::Duration;

use axum::error_handling::HandleErrorLayer;
use axum::http::StatusCode;
use axum::{BoxError, Router};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Maps middleware failures to responses: an expired deadline is 504.
async fn handle_middleware_error(err: BoxError) -> StatusCode {
    if err.is::<tower::timeout::error::Elapsed>() {
        StatusCode::GATEWAY_TIMEOUT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Builds the full application router.
pub fn build_router(app_state: AppState, request_timeout: Duration) -> Router {
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/orders", routes::orders::router())
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::error_handling::HandleErrorLayer;
    use axum::http::{Request, StatusCode};
    use axum::{Router, routing::get};
    use tower::{ServiceBuilder, ServiceExt};

    use super::handle_middleware_error;

    #[tokio::test]
    async fn test_request_past_deadline_returns_504() {
        // Arrange
        let app = Router::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_millis(500)).await;
                    "done"
                }),
            )
            .layer(
                ServiceBuilder::new()
                    .layer(HandleErrorLayer::new(handle_middleware_error))
                    .timeout(Duration::from_millis(10)),
            );
        let request = Request::builder().uri("/slow").body(Body::empty()).unwrap();

        // Act
        let response = app.oneshot(request).await.unwrap();

        // Assert
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}

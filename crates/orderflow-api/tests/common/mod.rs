//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use orderflow_core::repository::OrderRepository;
use orderflow_orders::domain::normalizer::TimestampPolicy;
use orderflow_store::aggregate_store::AggregateStore;
use orderflow_store::cache::OrderCache;
use tokio::task::JoinHandle;
use tower::ServiceExt;

use orderflow_api::build_router;
use orderflow_api::ingest::IngestServer;
use orderflow_api::state::AppState;

/// A running consumer plus the router, sharing one store.
pub struct TestService {
    pub store: Arc<AggregateStore>,
    pub ingest_addr: SocketAddr,
    ingest_task: JoinHandle<()>,
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.ingest_task.abort();
    }
}

impl TestService {
    /// Start a consumer on an ephemeral port over `repository`. The cache
    /// starts empty; call `store.hydrate()` to warm it.
    pub async fn start(repository: Arc<dyn OrderRepository>) -> Self {
        let store = Arc::new(AggregateStore::new(repository, Arc::new(OrderCache::new())));
        let ingest = IngestServer::bind("127.0.0.1:0", store.clone(), TimestampPolicy::Lenient)
            .await
            .unwrap();
        let ingest_addr = ingest.local_addr().unwrap();
        let ingest_task = tokio::spawn(ingest.run());
        Self {
            store,
            ingest_addr,
            ingest_task,
        }
    }

    /// The full app router over this service's store. Uses the same route
    /// structure as `main.rs`.
    pub fn app(&self) -> Router {
        let state = AppState::new(self.store.clone(), Arc::clone(self.store.cache()));
        build_router(state, Duration::from_secs(4))
    }

    /// Publish `message` to the consumer.
    pub async fn publish(&self, message: &serde_json::Value) {
        orderflow_api::ingest::publish(self.ingest_addr, &serde_json::to_vec(message).unwrap())
            .await
            .unwrap();
    }

    /// Poll the lookup endpoint until it answers 200, or give up after five
    /// seconds and return the last response.
    pub async fn wait_for_order(&self, order_uid: &str) -> (StatusCode, serde_json::Value) {
        let uri = format!("/api/v1/orders/{order_uid}");
        let mut last = get_json(self.app(), &uri).await;
        for _ in 0..100 {
            if last.0 == StatusCode::OK {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
            last = get_json(self.app(), &uri).await;
        }
        last
    }
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

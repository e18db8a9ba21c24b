//! End-to-end test against PostgreSQL.
//!
//! Needs a database: set `DATABASE_URL` and run with `cargo test -- --ignored`.

mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use orderflow_store::pg_order_repository::PgOrderRepository;
use orderflow_test_support::sample_message;
use sqlx::PgPool;

use common::{TestService, get_json};

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_orders_survive_restart_through_postgres(pool: PgPool) {
    let service = TestService::start(Arc::new(PgOrderRepository::new(pool.clone()))).await;
    service.publish(&sample_message("A1")).await;
    let (status, before) = service.wait_for_order("A1").await;
    assert_eq!(status, StatusCode::OK);
    drop(service);

    let restarted = TestService::start(Arc::new(PgOrderRepository::new(pool))).await;
    let hydrated = restarted.store.hydrate().await.unwrap();
    let (status, after) = get_json(restarted.app(), "/api/v1/orders/A1").await;

    assert_eq!(hydrated, 1);
    assert_eq!(status, StatusCode::OK);
    assert_eq!(after, before);
}

//! Integration tests for `PgOrderRepository` and the store built on it.
//!
//! These need a PostgreSQL instance: set `DATABASE_URL` and run with
//! `cargo test -- --ignored`.

use std::sync::Arc;

use orderflow_core::repository::{OrderProvider, OrderRepository};
use orderflow_store::aggregate_store::AggregateStore;
use orderflow_store::cache::OrderCache;
use orderflow_store::pg_order_repository::PgOrderRepository;
use orderflow_test_support::sample_order;
use sqlx::PgPool;

async fn count(pool: &PgPool, table: &str, order_uid: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(&format!(
        "SELECT COUNT(*) FROM {table} WHERE order_uid = $1"
    ))
    .bind(order_uid)
    .fetch_one(pool)
    .await
    .unwrap()
}

// --- load_orders ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_load_orders_returns_empty_vec_for_empty_store(pool: PgPool) {
    let repo = PgOrderRepository::new(pool);

    let orders = repo.load_orders().await.unwrap();

    assert!(orders.is_empty());
}

// --- save_order + load_orders round-trip ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_save_and_load_full_aggregate(pool: PgPool) {
    let repo = PgOrderRepository::new(pool.clone());
    let order = sample_order("A1");

    repo.save_order(&order).await.unwrap();

    let loaded = repo.load_orders().await.unwrap();
    assert_eq!(loaded, vec![order]);
    assert_eq!(count(&pool, "orders", "A1").await, 1);
    assert_eq!(count(&pool, "delivery", "A1").await, 1);
    assert_eq!(count(&pool, "payment", "A1").await, 1);
    assert_eq!(count(&pool, "item", "A1").await, 2);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_save_order_without_items(pool: PgPool) {
    let repo = PgOrderRepository::new(pool);
    let mut order = sample_order("A1");
    order.items.clear();

    repo.save_order(&order).await.unwrap();

    let loaded = repo.load_orders().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert!(loaded[0].items.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_save_and_load_order_with_thousands_of_items(pool: PgPool) {
    // Arrange
    let repo = PgOrderRepository::new(pool.clone());
    let mut order = sample_order("A1");
    let template = order.items[0].clone();
    order.items = (0..6000)
        .map(|chrt_id| {
            let mut item = template.clone();
            item.chrt_id = chrt_id;
            item
        })
        .collect();

    // Act
    repo.save_order(&order).await.unwrap();
    let loaded = repo.load_orders().await.unwrap();

    // Assert
    assert_eq!(count(&pool, "item", "A1").await, 6000);
    assert_eq!(loaded, vec![order]);
}

// --- last write wins ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_save_same_uid_replaces_every_relation(pool: PgPool) {
    let repo = PgOrderRepository::new(pool.clone());
    let first = sample_order("A1");
    let mut second = sample_order("A1");
    second.items.truncate(1);
    second.delivery.city = "Haifa".to_owned();
    second.payment.amount = 99;
    second.sm_id = 7;

    repo.save_order(&first).await.unwrap();
    repo.save_order(&second).await.unwrap();

    let loaded = repo.load_orders().await.unwrap();
    assert_eq!(loaded, vec![second]);
    assert_eq!(count(&pool, "item", "A1").await, 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_save_with_fewer_items_removes_trailing_rows(pool: PgPool) {
    let repo = PgOrderRepository::new(pool.clone());
    let mut first = sample_order("A1");
    first.items = vec![first.items[0].clone(); 5];
    let mut second = sample_order("A1");
    second.items.clear();

    repo.save_order(&first).await.unwrap();
    repo.save_order(&second).await.unwrap();

    assert_eq!(count(&pool, "item", "A1").await, 0);
    assert_eq!(repo.load_orders().await.unwrap(), vec![second]);
}

// --- atomicity ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_failed_save_leaves_no_partial_aggregate(pool: PgPool) {
    let repo = PgOrderRepository::new(pool.clone());
    let mut order = sample_order("A1");
    // Exceeds delivery.phone VARCHAR(20); the orders row in the same statement
    // must not survive.
    order.delivery.phone = "9".repeat(64);

    let result = repo.save_order(&order).await;

    assert!(result.is_err());
    assert_eq!(count(&pool, "orders", "A1").await, 0);
    assert!(repo.load_orders().await.unwrap().is_empty());
}

// --- ordering and isolation ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_items_keep_their_position_and_owner(pool: PgPool) {
    let repo = PgOrderRepository::new(pool);
    let a = sample_order("A1");
    let mut b = sample_order("B2");
    b.items.reverse();

    repo.save_order(&a).await.unwrap();
    repo.save_order(&b).await.unwrap();

    let loaded = repo.load_orders().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0], a);
    assert_eq!(loaded[1], b);
    assert_eq!(loaded[1].items[0].name, "Lipstick");
}

// --- store over postgres ---

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires PostgreSQL"]
async fn test_hydrate_after_restart_serves_persisted_orders(pool: PgPool) {
    let order = sample_order("A1");
    let before = AggregateStore::new(
        Arc::new(PgOrderRepository::new(pool.clone())),
        Arc::new(OrderCache::new()),
    );
    before.persist(order.clone()).await.unwrap();
    assert_eq!(before.order("A1").await.unwrap(), order);

    let after = AggregateStore::new(
        Arc::new(PgOrderRepository::new(pool)),
        Arc::new(OrderCache::new()),
    );
    assert!(after.order("A1").await.is_err());

    let hydrated = after.hydrate().await.unwrap();

    assert_eq!(hydrated, 1);
    assert_eq!(after.order("A1").await.unwrap(), order);
}

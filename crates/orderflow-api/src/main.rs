//! Orderflow service entry point.

use std::sync::Arc;

use orderflow_api::config::Config;
use orderflow_api::error::AppError;
use orderflow_api::ingest::IngestServer;
use orderflow_api::state::AppState;
use orderflow_api::{build_router, telemetry};
use orderflow_store::aggregate_store::AggregateStore;
use orderflow_store::cache::OrderCache;
use orderflow_store::pg_order_repository::PgOrderRepository;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let _telemetry = telemetry::init("orderflow")?;

    tracing::info!("Starting Orderflow order service");

    let config = Config::load()?;
    tracing::info!(env = %config.env, "configuration loaded");

    // Create database connection pool and bring the schema up to date.
    let pool = PgPoolOptions::new()
        .max_connections(config.postgresql.max_connections)
        .connect_with(config.postgresql.connect_options()?)
        .await?;
    let repository = PgOrderRepository::new(pool);
    repository.migrate().await?;

    let cache = Arc::new(OrderCache::new());
    let store = Arc::new(AggregateStore::new(
        Arc::new(repository),
        Arc::clone(&cache),
    ));

    // Hydrate before anything can write to or read from the cache. A failure
    // leaves the cache cold; the service keeps running.
    if let Err(e) = store.hydrate().await {
        tracing::error!(error = %e, "cache hydration failed, serving from a cold cache");
    }

    let ingest = IngestServer::bind(
        config.ingest.listen_addr.as_str(),
        store.clone(),
        config.ingest.timestamp_policy(),
    )
    .await?;
    let ingest_task = tokio::spawn(ingest.run());

    let app_state = AppState::new(store, cache);
    let app = build_router(app_state, config.http_server.request_timeout());

    let addr = config.http_server.socket_addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    ingest_task.abort();
    tracing::info!("Orderflow order service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

//! Orderflow Store: durable persistence and the in-memory order cache.
//!
//! [`aggregate_store::AggregateStore`] ties a durable
//! [`OrderRepository`](orderflow_core::repository::OrderRepository) to an
//! [`cache::OrderCache`]: writes go to the backend first and reach the cache
//! only once committed, reads are answered from the cache alone.

pub mod aggregate_store;
pub mod cache;
pub mod pg_order_repository;

//! Orderflow: order ingestion and lookup.
//!
//! Turns inbound order messages into aggregates and hands them to an
//! `OrderSaver`; answers lookups through an `OrderProvider`.

pub mod application;
pub mod domain;

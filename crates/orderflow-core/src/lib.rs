//! Orderflow Core: the order aggregate and the seams around it.
//!
//! This crate defines the aggregate model, the domain error type and the
//! capability traits that the store, the ingestion path and the HTTP layer
//! depend on. It contains no infrastructure code.

pub mod error;
pub mod order;
pub mod repository;

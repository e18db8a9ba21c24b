//! Shared test doubles and fixtures for the Orderflow service.

mod fixtures;
mod repository;
mod saver;

pub use fixtures::{sample_message, sample_order};
pub use repository::{FailingOrderRepository, InMemoryOrderRepository};
pub use saver::{FailingOrderSaver, RecordingOrderSaver};

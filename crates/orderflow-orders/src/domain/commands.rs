//! Commands for the ingestion path.

use uuid::Uuid;

/// Command carrying one raw message taken off the bus.
#[derive(Debug, Clone)]
pub struct IngestOrderMessage {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The message body, exactly as delivered.
    pub payload: Vec<u8>,
}

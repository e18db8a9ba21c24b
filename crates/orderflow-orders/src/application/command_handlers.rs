//! Command handlers for the ingestion path.
//!
//! A message either becomes an aggregate handed to the `OrderSaver`, or is
//! dropped and reported. Dropped messages are not retried or requeued;
//! acknowledgement is left to whoever delivered the bytes.

use orderflow_core::error::DomainError;
use orderflow_core::repository::OrderSaver;
use tracing::{info, instrument, warn};

use crate::domain::commands::IngestOrderMessage;
use crate::domain::normalizer::{NormalizeError, TimestampPolicy, normalize};

/// Result of handling one message.
#[derive(Debug)]
pub enum IngestOutcome {
    /// The aggregate was committed and cached.
    Persisted {
        /// UID of the stored order.
        order_uid: String,
    },
    /// The message was dropped before reaching the store.
    Dropped(NormalizeError),
}

/// Handles the `IngestOrderMessage` command: normalizes the payload and
/// persists the resulting aggregate.
///
/// # Errors
///
/// Returns `DomainError` if the saver fails. Invalid messages are not errors;
/// they come back as `IngestOutcome::Dropped`.
#[instrument(skip(command, policy, saver), fields(correlation_id = %command.correlation_id, bytes = command.payload.len()))]
pub async fn handle_ingest_order_message(
    command: &IngestOrderMessage,
    policy: TimestampPolicy,
    saver: &dyn OrderSaver,
) -> Result<IngestOutcome, DomainError> {
    let order = match normalize(&command.payload, policy) {
        Ok(order) => order,
        Err(reason) => {
            warn!(reason = %reason, "order message dropped");
            return Ok(IngestOutcome::Dropped(reason));
        }
    };

    let order_uid = order.order_uid.clone();
    info!(order_uid = %order_uid, "processing a new order");
    saver.save_order(order).await?;

    Ok(IngestOutcome::Persisted { order_uid })
}

#[cfg(test)]
mod tests {
    use orderflow_core::error::DomainError;
    use orderflow_test_support::{
        FailingOrderSaver, RecordingOrderSaver, sample_message, sample_order,
    };
    use uuid::Uuid;

    use crate::application::command_handlers::{IngestOutcome, handle_ingest_order_message};
    use crate::domain::commands::IngestOrderMessage;
    use crate::domain::normalizer::{NormalizeError, TimestampPolicy};

    fn command(payload: Vec<u8>) -> IngestOrderMessage {
        IngestOrderMessage {
            correlation_id: Uuid::new_v4(),
            payload,
        }
    }

    #[tokio::test]
    async fn test_valid_message_is_saved() {
        // Arrange
        let saver = RecordingOrderSaver::new();
        let command = command(serde_json::to_vec(&sample_message("A1")).unwrap());

        // Act
        let outcome = handle_ingest_order_message(&command, TimestampPolicy::Lenient, &saver)
            .await
            .unwrap();

        // Assert
        match outcome {
            IngestOutcome::Persisted { order_uid } => assert_eq!(order_uid, "A1"),
            IngestOutcome::Dropped(reason) => panic!("unexpected drop: {reason}"),
        }
        assert_eq!(saver.saved_orders(), vec![sample_order("A1")]);
    }

    #[tokio::test]
    async fn test_malformed_message_is_dropped_without_save() {
        // Arrange
        let saver = RecordingOrderSaver::new();
        let command = command(b"not json".to_vec());

        // Act
        let outcome = handle_ingest_order_message(&command, TimestampPolicy::Lenient, &saver)
            .await
            .unwrap();

        // Assert
        assert!(matches!(
            outcome,
            IngestOutcome::Dropped(NormalizeError::Malformed(_))
        ));
        assert!(saver.saved_orders().is_empty());
    }

    #[tokio::test]
    async fn test_empty_date_created_is_dropped_without_save() {
        // Arrange
        let saver = RecordingOrderSaver::new();
        let mut message = sample_message("A2");
        message["date_created"] = serde_json::json!("");
        let command = command(serde_json::to_vec(&message).unwrap());

        // Act
        let outcome = handle_ingest_order_message(&command, TimestampPolicy::Lenient, &saver)
            .await
            .unwrap();

        // Assert
        assert!(matches!(
            outcome,
            IngestOutcome::Dropped(NormalizeError::MissingDateCreated)
        ));
        assert!(saver.saved_orders().is_empty());
    }

    #[tokio::test]
    async fn test_saver_failure_is_propagated() {
        let command = command(serde_json::to_vec(&sample_message("A1")).unwrap());

        let result =
            handle_ingest_order_message(&command, TimestampPolicy::Lenient, &FailingOrderSaver)
                .await;

        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
    }
}

//! The notification sink contract.
//!
//! A sink accepts `(recipient, subject, body)` and tries to deliver it.
//! Callers treat delivery as fire-and-forget: an error is logged, never
//! propagated into the workflow that triggered it.

use async_trait::async_trait;

use crate::delivery::email::EmailError;

/// Error type for notification delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The email channel failed.
    #[error(transparent)]
    Email(#[from] EmailError),

    /// The event payload could not be decoded into a message.
    #[error("Notification payload invalid: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Best-effort outbound message delivery.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), NotificationError>;
}

/// Sink used when no mail transport is configured. Logs and succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        _body: &str,
    ) -> Result<(), NotificationError> {
        tracing::info!(to = recipient, subject, "Email delivery not configured, notification logged only");
        Ok(())
    }
}

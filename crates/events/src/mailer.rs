//! Confirmation emails for submitted feedback.
//!
//! [`ConfirmationMailer`] subscribes to the event bus and, for each
//! `feedback.submitted` event, sends the stakeholder a short receipt through
//! a [`NotificationSink`]. Delivery failures are logged and dropped; the
//! submission they describe is already committed.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::bus::{FeedbackSubmitted, PlatformEvent};
use crate::sink::{NotificationError, NotificationSink};

/// Subject prefix for every confirmation email.
const SUBJECT_PREFIX: &str = "[Keystone]";

/// Routes `feedback.submitted` events to a notification sink.
pub struct ConfirmationMailer {
    sink: Arc<dyn NotificationSink>,
}

impl ConfirmationMailer {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Run the main loop.
    ///
    /// The loop exits when the channel is closed (i.e. the
    /// [`EventBus`](crate::EventBus) is dropped).
    pub async fn run(self, mut receiver: broadcast::Receiver<PlatformEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle_event(&event).await {
                        tracing::warn!(
                            error = %e,
                            event_type = %event.event_type,
                            source_entity_id = ?event.source_entity_id,
                            "Confirmation email failed"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Confirmation mailer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, confirmation mailer shutting down");
                    break;
                }
            }
        }
    }

    /// Send the confirmation for one event. Other event types are ignored.
    pub async fn handle_event(&self, event: &PlatformEvent) -> Result<(), NotificationError> {
        let Some(payload) = FeedbackSubmitted::from_event(event) else {
            return Ok(());
        };
        let submitted = payload?;
        let (subject, body) = compose_confirmation(&submitted);
        self.sink
            .send(&submitted.stakeholder_email, &subject, &body)
            .await
    }
}

/// Build the subject and plain-text body of a confirmation email.
pub fn compose_confirmation(submitted: &FeedbackSubmitted) -> (String, String) {
    let subject = format!(
        "{SUBJECT_PREFIX} Feedback received: {} / {}",
        submitted.package_name, submitted.focus_area_name
    );

    let mut body = format!(
        "Thank you for your feedback on {} ({}, version {}).\n",
        submitted.package_name, submitted.focus_area_name, submitted.version_number
    );
    if submitted.itemized_count > 0 {
        body.push_str(&format!(
            "Responses recorded for {} item(s).\n",
            submitted.itemized_count
        ));
    }
    if submitted.general_feedback_id.is_some() {
        body.push_str("Your written comments were recorded.\n");
    }
    body.push_str("No further action is needed.\n");

    (subject, body)
}

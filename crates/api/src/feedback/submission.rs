//! The submission engine as seen from HTTP.
//!
//! Turns the repository outcome into a [`SubmissionResult`] and, after a
//! commit, publishes `feedback.submitted` for the confirmation mailer.

use std::sync::Arc;

use keystone_core::error::CoreError;
use keystone_core::submission::{SubmissionInput, SubmissionResult};
use keystone_core::types::DbId;
use keystone_db::repositories::{
    CommittedSubmission, FeedbackSubmissionRepo, FocusAreaVersionRepo, SubmissionOutcome,
};
use keystone_db::DbPool;
use keystone_events::{EventBus, FeedbackSubmitted};

use crate::error::{AppError, AppResult};

/// Submit feedback for a session.
///
/// Only a missing session is an error. Every other outcome, including a
/// rolled-back transaction, is reported through [`SubmissionResult`].
pub async fn submit(
    pool: &DbPool,
    event_bus: &Arc<EventBus>,
    session_id: DbId,
    input: &SubmissionInput,
) -> AppResult<SubmissionResult> {
    let outcome = match FeedbackSubmissionRepo::submit(pool, session_id, input).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(session_id, error = %e, "Feedback submission rolled back");
            return Ok(SubmissionResult::PersistenceFailure);
        }
    };

    let result = match outcome {
        SubmissionOutcome::Committed(committed) => {
            let result = SubmissionResult::Success {
                general_feedback_id: committed.general.as_ref().map(|g| g.id),
                itemized_count: committed.itemized.len(),
            };
            tracing::info!(
                session_id,
                itemized_count = committed.itemized.len(),
                general = committed.general.is_some(),
                "Feedback submitted"
            );
            spawn_notification(pool.clone(), Arc::clone(event_bus), committed);
            result
        }
        SubmissionOutcome::AlreadyResponded => {
            tracing::info!(session_id, "Feedback session already responded");
            SubmissionResult::AlreadySubmitted
        }
        SubmissionOutcome::Rejected(field_error) => {
            tracing::info!(
                session_id,
                field = field_error.field,
                message = %field_error.message,
                "Feedback submission rejected"
            );
            field_error.into()
        }
        SubmissionOutcome::SessionNotFound => {
            return Err(AppError::Core(CoreError::NotFound {
                entity: "FeedbackSession",
                id: session_id,
            }));
        }
    };

    Ok(result)
}

/// Publish `feedback.submitted` in the background.
///
/// Runs after commit and never affects the submit response; a failed
/// lookup only logs.
fn spawn_notification(pool: DbPool, event_bus: Arc<EventBus>, committed: CommittedSubmission) {
    tokio::spawn(async move {
        let session = &committed.session;
        let summary = match FocusAreaVersionRepo::find_summary(&pool, session.focus_area_version_id)
            .await
        {
            Ok(Some(summary)) => summary,
            Ok(None) => {
                tracing::warn!(session_id = session.id, "Version missing, confirmation skipped");
                return;
            }
            Err(e) => {
                tracing::warn!(session_id = session.id, error = %e, "Confirmation lookup failed");
                return;
            }
        };

        let payload = FeedbackSubmitted {
            feedback_session_id: session.id,
            stakeholder_email: session.stakeholder_email.clone(),
            package_name: summary.package_name,
            focus_area_name: summary.focus_area_name,
            version_number: summary.version_number,
            form_type: session.form_type.clone(),
            general_feedback_id: committed.general.as_ref().map(|g| g.id),
            itemized_count: committed.itemized.len(),
        };
        event_bus.publish(payload.into_event());
    });
}

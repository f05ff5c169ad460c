//! The feedback submission transaction.
//!
//! Closing a session and writing its detail rows happen in one transaction.
//! The transition is a conditional update on `responded_at IS NULL`, so two
//! concurrent submissions for the same session serialize on the row lock and
//! the loser sees zero affected rows.

use sqlx::PgPool;
use keystone_core::submission::{validate_submission, FieldError, SubmissionInput};
use keystone_core::types::DbId;

use crate::models::feedback::{GeneralFeedback, ItemizedFeedback};
use crate::models::feedback_session::FeedbackSession;
use crate::repositories::{FeedbackSessionRepo, GeneralFeedbackRepo, ItemizedFeedbackRepo};

/// Rows written by a committed submission.
#[derive(Debug, Clone)]
pub struct CommittedSubmission {
    /// The session as of commit, with `responded_at` set.
    pub session: FeedbackSession,
    pub general: Option<GeneralFeedback>,
    pub itemized: Vec<ItemizedFeedback>,
}

/// Result of [`FeedbackSubmissionRepo::submit`].
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Committed(CommittedSubmission),
    /// The session was already responded to. Nothing was written.
    AlreadyResponded,
    /// No session has this ID.
    SessionNotFound,
    /// The payload failed validation. The transaction was rolled back.
    Rejected(FieldError),
}

/// Runs the one-shot Pending → Responded transition.
pub struct FeedbackSubmissionRepo;

impl FeedbackSubmissionRepo {
    /// Close a pending session and persist its feedback atomically.
    ///
    /// The idempotency guard runs before validation: a responded session
    /// reports [`SubmissionOutcome::AlreadyResponded`] whatever the payload.
    /// Any database error rolls the whole transaction back (the transaction
    /// is dropped uncommitted) and is returned to the caller.
    pub async fn submit(
        pool: &PgPool,
        session_id: DbId,
        input: &SubmissionInput,
    ) -> Result<SubmissionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(session) = FeedbackSessionRepo::mark_responded(&mut *tx, session_id).await? else {
            let exists = FeedbackSessionRepo::exists(&mut *tx, session_id).await?;
            tx.rollback().await?;
            return Ok(if exists {
                SubmissionOutcome::AlreadyResponded
            } else {
                SubmissionOutcome::SessionNotFound
            });
        };

        let validated = {
            let terms = session
                .terms()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
            validate_submission(&terms, input)
        };
        let validated = match validated {
            Ok(v) => v,
            Err(field_error) => {
                tx.rollback().await?;
                return Ok(SubmissionOutcome::Rejected(field_error));
            }
        };

        let general = match &validated.free_text {
            Some(body) => Some(GeneralFeedbackRepo::create(&mut *tx, &session, body).await?),
            None => None,
        };

        let mut itemized = Vec::with_capacity(validated.verdicts.len());
        for verdict in &validated.verdicts {
            itemized.push(ItemizedFeedbackRepo::create(&mut *tx, &session, verdict).await?);
        }

        tx.commit().await?;

        tracing::debug!(
            session_id,
            general = general.is_some(),
            itemized = itemized.len(),
            "Feedback submission committed"
        );

        Ok(SubmissionOutcome::Committed(CommittedSubmission {
            session,
            general,
            itemized,
        }))
    }
}

//! Post-submission experience ratings.

use keystone_core::error::CoreError;
use keystone_core::feedback::validate_experience_text;
use keystone_db::models::feedback::{CreateExperienceFeedback, ExperienceFeedback};
use keystone_db::models::feedback_session::FeedbackSession;
use keystone_db::repositories::{ExperienceFeedbackRepo, GeneralFeedbackRepo};
use keystone_db::DbPool;

use crate::error::{AppError, AppResult};

/// Attach a one-time experience rating to the session's general feedback.
///
/// The general feedback row must belong to `session`. A second rating for
/// the same row is a [`CoreError::Conflict`], whether it is caught by the
/// lookup or by `uq_experience_feedback_general_feedback_id` on a race.
pub async fn record_experience(
    pool: &DbPool,
    session: &FeedbackSession,
    input: &CreateExperienceFeedback,
) -> AppResult<ExperienceFeedback> {
    let not_found = || {
        AppError::Core(CoreError::NotFound {
            entity: "GeneralFeedback",
            id: input.general_feedback_id,
        })
    };

    let general = GeneralFeedbackRepo::find_by_id(pool, input.general_feedback_id)
        .await?
        .ok_or_else(not_found)?;
    if general.feedback_session_id != session.id {
        return Err(not_found());
    }

    validate_experience_text(&input.body)?;

    if ExperienceFeedbackRepo::find_for_general_feedback(pool, general.id)
        .await?
        .is_some()
    {
        return Err(already_recorded());
    }

    let rating = ExperienceFeedbackRepo::create(pool, general.id, input.body.trim())
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => already_recorded(),
            _ => AppError::Database(err),
        })?;

    tracing::info!(
        session_id = session.id,
        general_feedback_id = general.id,
        "Experience feedback recorded"
    );

    Ok(rating)
}

fn already_recorded() -> AppError {
    AppError::Core(CoreError::Conflict(
        "Experience feedback already recorded".to_string(),
    ))
}

//! Handlers for the stakeholder feedback workflow.
//!
//! `resolve` is the only public entry point; every other handler requires
//! the [`StakeholderContext`] it issues.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use keystone_core::submission::{SubmissionInput, SubmissionReport, SubmissionResult};
use keystone_db::models::feedback::CreateExperienceFeedback;

use crate::error::AppResult;
use crate::feedback::{experience, pending, projector, resolver, submission};
use crate::middleware::stakeholder::StakeholderContext;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/feedback/resolve
///
/// Exchange an opaque feedback token for a signed stakeholder context.
pub async fn resolve_token(
    State(state): State<AppState>,
    input: Result<Json<resolver::ResolveRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let resolved = resolver::resolve(&state.pool, &state.config, &input).await?;
    Ok(Json(DataResponse { data: resolved }))
}

/// GET /api/v1/feedback/form
///
/// The form for the context's session, or the terminal "already submitted"
/// page.
pub async fn get_form(
    ctx: StakeholderContext,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let session = resolver::load_session(&state.pool, &ctx).await?;
    let page = projector::project(&state.pool, &session).await?;
    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/feedback/submit
///
/// Submit the stakeholder's answers. The body is always a submission
/// report; the status code tells the outcome apart.
pub async fn submit_feedback(
    ctx: StakeholderContext,
    State(state): State<AppState>,
    input: Result<Json<SubmissionInput>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let session = resolver::load_session(&state.pool, &ctx).await?;
    let result = submission::submit(&state.pool, &state.event_bus, session.id, &input).await?;

    let status = submission_status(&result);
    Ok((
        status,
        Json(DataResponse {
            data: SubmissionReport::from(result),
        }),
    ))
}

/// POST /api/v1/feedback/experience
///
/// Rate the submission experience once per general feedback row.
pub async fn record_experience(
    ctx: StakeholderContext,
    State(state): State<AppState>,
    input: Result<Json<CreateExperienceFeedback>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let session = resolver::load_session(&state.pool, &ctx).await?;
    let rating = experience::record_experience(&state.pool, &session, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: rating })))
}

/// GET /api/v1/feedback/pending
///
/// Every pending request addressed to the context's email.
pub async fn list_pending(
    ctx: StakeholderContext,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let list = pending::list_pending(&state.pool, &state.config.feedback, &ctx.email).await?;
    Ok(Json(DataResponse { data: list }))
}

fn submission_status(result: &SubmissionResult) -> StatusCode {
    match result {
        SubmissionResult::Success { .. } => StatusCode::CREATED,
        SubmissionResult::AlreadySubmitted => StatusCode::CONFLICT,
        SubmissionResult::ValidationError { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        SubmissionResult::PersistenceFailure => StatusCode::SERVICE_UNAVAILABLE,
    }
}

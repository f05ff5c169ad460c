//! Route definitions for the stakeholder feedback workflow.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::feedback;
use crate::state::AppState;

/// Feedback routes, nested under `/feedback`.
///
/// ```text
/// POST   /resolve       resolve_token
/// GET    /form          get_form
/// POST   /submit        submit_feedback
/// POST   /experience    record_experience
/// GET    /pending       list_pending
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/resolve", post(feedback::resolve_token))
        .route("/form", get(feedback::get_form))
        .route("/submit", post(feedback::submit_feedback))
        .route("/experience", post(feedback::record_experience))
        .route("/pending", get(feedback::list_pending))
}

pub mod feedback;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /feedback/resolve                                resolve token (public)
/// /feedback/form                                   form or terminal page (context)
/// /feedback/submit                                 submit answers (context)
/// /feedback/experience                             rate the experience (context)
/// /feedback/pending                                pending worklist (context)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Stakeholder feedback workflow.
        .nest("/feedback", feedback::router())
}

//! Opaque token resolution and context verification.

use keystone_core::error::CoreError;
use keystone_core::feedback::normalize_email;
use keystone_core::types::DbId;
use keystone_db::models::feedback_session::FeedbackSession;
use keystone_db::repositories::FeedbackSessionRepo;
use keystone_db::DbPool;
use serde::{Deserialize, Serialize};

use crate::auth::context::{issue_context_token, token_fingerprint};
use crate::config::ServerConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::stakeholder::StakeholderContext;

/// Entity name reported when a token or context matches no session.
const SESSION_ENTITY: &str = "FeedbackSession";

/// Request body for `POST /feedback/resolve`.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveRequest {
    pub token: String,
    #[serde(default)]
    pub pin: Option<i32>,
}

/// A resolved session and the context token bound to it.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSession {
    pub context_token: String,
    pub expires_at: i64,
    pub feedback_session_id: DbId,
    pub form_type: String,
    /// `true` when the session was already responded to. The form endpoint
    /// will show the terminal view.
    pub responded: bool,
}

fn session_not_found() -> AppError {
    AppError::Core(CoreError::NotFoundByKey {
        entity: SESSION_ENTITY,
    })
}

/// Resolve an opaque feedback token into a signed stakeholder context.
///
/// Read-only. A blank token, an unknown token, and (when PIN enforcement
/// is on) a wrong PIN all answer the same `NotFound`.
pub async fn resolve(
    pool: &DbPool,
    config: &ServerConfig,
    request: &ResolveRequest,
) -> AppResult<ResolvedSession> {
    let token = request.token.trim();
    if token.is_empty() {
        return Err(session_not_found());
    }

    let session = FeedbackSessionRepo::find_by_token(pool, token)
        .await?
        .ok_or_else(session_not_found)?;

    if config.feedback.require_pin && request.pin != Some(session.pin) {
        tracing::info!(session_id = session.id, "Feedback token resolved with wrong PIN");
        return Err(session_not_found());
    }

    let issued = issue_context_token(
        session.id,
        &session.stakeholder_email,
        token,
        &config.context,
    )
    .map_err(|e| AppError::InternalError(format!("Failed to sign feedback context: {e}")))?;

    tracing::debug!(
        session_id = session.id,
        pending = session.is_pending(),
        "Feedback token resolved"
    );

    Ok(ResolvedSession {
        context_token: issued.context_token,
        expires_at: issued.expires_at,
        feedback_session_id: session.id,
        form_type: session.form_type.clone(),
        responded: !session.is_pending(),
    })
}

/// Load the session a context was issued for.
///
/// The context must still match the stored row: same opaque token and same
/// stakeholder email. Anything else is `Unauthorized`.
pub async fn load_session(pool: &DbPool, ctx: &StakeholderContext) -> AppResult<FeedbackSession> {
    let session = FeedbackSessionRepo::find_by_id(pool, ctx.session_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: SESSION_ENTITY,
                id: ctx.session_id,
            })
        })?;

    let same_token = token_fingerprint(&session.token) == ctx.token_fingerprint;
    let same_email = normalize_email(&session.stakeholder_email) == normalize_email(&ctx.email);
    if !same_token || !same_email {
        tracing::warn!(session_id = session.id, "Feedback context does not match session");
        return Err(AppError::Core(CoreError::Unauthorized(
            "Feedback context does not match this session".into(),
        )));
    }

    Ok(session)
}

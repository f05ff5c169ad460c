//! Stakeholder context extractor for the feedback routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use keystone_core::error::CoreError;
use keystone_core::types::DbId;

use crate::auth::context::validate_context_token;
use crate::error::AppError;
use crate::state::AppState;

/// Resolved stakeholder identity taken from a context Bearer token.
///
/// Every feedback route except `resolve` takes this as a parameter, so a
/// request without a valid context never reaches a service:
///
/// ```ignore
/// async fn get_form(ctx: StakeholderContext) -> AppResult<Json<()>> {
///     tracing::info!(session_id = ctx.session_id, "loading form");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct StakeholderContext {
    /// The feedback session the context was issued for (`claims.sub`).
    pub session_id: DbId,
    /// The stakeholder email bound at resolve time.
    pub email: String,
    /// Fingerprint of the opaque token that was resolved.
    pub token_fingerprint: String,
}

impl FromRequestParts<AppState> for StakeholderContext {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_context_token(token, &state.config.context).map_err(|_| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid or expired feedback context".into(),
            ))
        })?;

        Ok(StakeholderContext {
            session_id: claims.sub,
            email: claims.email,
            token_fingerprint: claims.token_fingerprint,
        })
    }
}

//! Stakeholder context token generation and validation.
//!
//! Resolving an opaque feedback token yields an HS256-signed JWT carrying
//! the session id, the stakeholder email, and a SHA-256 fingerprint of the
//! opaque token. The fingerprint ties the context to the exact token that
//! produced it without putting the token itself in the JWT.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use keystone_core::types::DbId;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Claims embedded in every stakeholder context token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StakeholderClaims {
    /// Subject -- the feedback session id.
    pub sub: DbId,
    /// The stakeholder email the session is addressed to.
    pub email: String,
    /// SHA-256 hex digest of the opaque feedback token.
    pub token_fingerprint: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

/// Configuration for context token signing.
#[derive(Debug, Clone)]
pub struct ContextConfig {
    /// HMAC-SHA256 secret used to sign and verify context tokens.
    pub secret: String,
    /// Context lifetime in minutes (default: 120).
    pub expiry_mins: i64,
}

/// Default context lifetime in minutes.
const DEFAULT_CONTEXT_EXPIRY_MINS: i64 = 120;

impl ContextConfig {
    /// Load context configuration from environment variables.
    ///
    /// | Env Var                        | Required | Default |
    /// |--------------------------------|----------|---------|
    /// | `JWT_SECRET`                   | **yes**  | --      |
    /// | `FEEDBACK_CONTEXT_EXPIRY_MINS` | no       | `120`   |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let expiry_mins: i64 = std::env::var("FEEDBACK_CONTEXT_EXPIRY_MINS")
            .unwrap_or_else(|_| DEFAULT_CONTEXT_EXPIRY_MINS.to_string())
            .parse()
            .expect("FEEDBACK_CONTEXT_EXPIRY_MINS must be a valid i64");

        Self {
            secret,
            expiry_mins,
        }
    }
}

/// A freshly issued context token and its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedContext {
    pub context_token: String,
    /// Expiration time (UTC Unix timestamp).
    pub expires_at: i64,
}

/// Issue a context token for a resolved feedback session.
pub fn issue_context_token(
    session_id: DbId,
    email: &str,
    opaque_token: &str,
    config: &ContextConfig,
) -> Result<IssuedContext, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.expiry_mins * 60;

    let claims = StakeholderClaims {
        sub: session_id,
        email: email.to_string(),
        token_fingerprint: token_fingerprint(opaque_token),
        exp,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    let context_token = encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;

    Ok(IssuedContext {
        context_token,
        expires_at: exp,
    })
}

/// Validate and decode a context token, returning the embedded claims.
pub fn validate_context_token(
    token: &str,
    config: &ContextConfig,
) -> Result<StakeholderClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<StakeholderClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}

/// Compute the SHA-256 hex digest of an opaque feedback token.
pub fn token_fingerprint(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

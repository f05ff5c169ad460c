use url::Url;

use crate::auth::context::ContextConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Seconds to wait for background tasks after the server stops (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Upper bound on pooled database connections (default: `20`).
    pub db_max_connections: u32,
    /// Stakeholder context signing configuration.
    pub context: ContextConfig,
    /// Feedback workflow options.
    pub feedback: FeedbackConfig,
}

/// Options for the stakeholder feedback workflow.
#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    /// Require the session PIN alongside the token when resolving.
    pub require_pin: bool,
    /// Base URL for re-entry links; the session token is appended as a
    /// path segment.
    pub link_base_url: Url,
}

impl FeedbackConfig {
    /// Build a re-entry link for a session token.
    ///
    /// The token is percent-encoded as a single path segment.
    pub fn link_for(&self, token: &str) -> String {
        let mut link = self.link_base_url.clone();
        if let Ok(mut segments) = link.path_segments_mut() {
            segments.pop_if_empty().push(token);
        }
        link.to_string()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                                  |
    /// |----------------------------|------------------------------------------|
    /// | `HOST`                     | `0.0.0.0`                                |
    /// | `PORT`                     | `3000`                                   |
    /// | `CORS_ORIGINS`             | `http://localhost:5173`                  |
    /// | `REQUEST_TIMEOUT_SECS`     | `30`                                     |
    /// | `SHUTDOWN_TIMEOUT_SECS`    | `30`                                     |
    /// | `DATABASE_MAX_CONNECTIONS` | `20`                                     |
    /// | `FEEDBACK_REQUIRE_PIN`     | `false`                                  |
    /// | `FEEDBACK_LINK_BASE_URL`   | `http://localhost:5173/feedback`         |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let db_max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| keystone_db::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse()
            .expect("DATABASE_MAX_CONNECTIONS must be a valid u32");

        let require_pin = std::env::var("FEEDBACK_REQUIRE_PIN")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let link_base_url: Url = std::env::var("FEEDBACK_LINK_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5173/feedback".into())
            .parse()
            .expect("FEEDBACK_LINK_BASE_URL must be a valid URL");
        assert!(
            !link_base_url.cannot_be_a_base(),
            "FEEDBACK_LINK_BASE_URL must be a hierarchical URL"
        );

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            db_max_connections,
            context: ContextConfig::from_env(),
            feedback: FeedbackConfig {
                require_pin,
                link_base_url,
            },
        }
    }
}

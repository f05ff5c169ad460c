use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: keystone_db::DbPool,
    /// Server configuration (context signing, feedback options).
    pub config: Arc<ServerConfig>,
    /// Event bus for post-commit notifications.
    pub event_bus: Arc<keystone_events::EventBus>,
}

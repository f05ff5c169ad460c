#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use keystone_api::auth::context::ContextConfig;
use keystone_api::config::{FeedbackConfig, ServerConfig};
use keystone_api::router::build_app_router;
use keystone_api::state::AppState;
use keystone_core::feedback::FormType;
use keystone_db::models::content::{CreateContentPackage, CreateContentRecord, CreateFocusArea};
use keystone_db::models::feedback_session::{CreateFeedbackSession, FeedbackSession};
use keystone_db::repositories::{
    ContentPackageRepo, ContentRecordRepo, FeedbackSessionRepo, FocusAreaRepo,
    FocusAreaVersionRepo,
};
use keystone_events::EventBus;

pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const LINK_BASE: &str = "https://feedback.example.com/respond";

/// Build a test `ServerConfig` with safe defaults.
///
/// Uses `http://localhost:5173` as CORS origin (matching the dev default),
/// a 30-second request timeout, and no PIN enforcement.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        db_max_connections: 5,
        context: ContextConfig {
            secret: TEST_SECRET.to_string(),
            expiry_mins: 120,
        },
        feedback: FeedbackConfig {
            require_pin: false,
            link_base_url: url::Url::parse(LINK_BASE).unwrap(),
        },
    }
}

/// Build the full application router with the production middleware stack.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config()).0
}

/// Like [`build_test_app`], with a custom config. Also returns the event bus
/// so tests can observe published events.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> (Router, Arc<EventBus>) {
    let event_bus = Arc::new(EventBus::default());
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
    };
    (build_app_router(state, &config), event_bus)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_with_bearer(app: Router, uri: &str, bearer: &str) -> Response {
    send(app, Method::GET, uri, Some(bearer), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_with_bearer(
    app: Router,
    uri: &str,
    bearer: &str,
    body: serde_json::Value,
) -> Response {
    send(app, Method::POST, uri, Some(bearer), Some(body)).await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    bearer: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

/// Resolve a feedback token through the API and return the context token.
pub async fn resolve_context(app: Router, token: &str) -> String {
    let response = post_json(
        app,
        "/api/v1/feedback/resolve",
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    let json = body_json(response).await;
    json["data"]["context_token"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// IDs of a package → focus area → version hierarchy.
pub struct Fixture {
    pub package_id: i64,
    pub focus_area_id: i64,
    pub version_id: i64,
}

/// Seed "Q3 Risk Review / Liquidity" v1 with one record per grid index.
///
/// Records are inserted in reverse grid order so display order and grid
/// index disagree.
pub async fn seed_version(pool: &PgPool, grid_indexes: &[i32]) -> Fixture {
    let package = ContentPackageRepo::create(
        pool,
        &CreateContentPackage {
            name: "Q3 Risk Review".to_string(),
            summary: Some("Quarterly risk assessment".to_string()),
        },
    )
    .await
    .unwrap();
    let focus_area = FocusAreaRepo::create(
        pool,
        &CreateFocusArea {
            package_id: package.id,
            name: "Liquidity".to_string(),
        },
    )
    .await
    .unwrap();
    let version = FocusAreaVersionRepo::create(pool, focus_area.id)
        .await
        .unwrap();

    for (i, grid_index) in grid_indexes.iter().rev().enumerate() {
        ContentRecordRepo::create(
            pool,
            &CreateContentRecord {
                focus_area_version_id: version.id,
                display_order: i as i32,
                grid_index: *grid_index,
                properties: vec![
                    ("Finding".to_string(), format!("Item {grid_index}")),
                    ("Owner".to_string(), "Treasury".to_string()),
                ],
            },
        )
        .await
        .unwrap();
    }
    FocusAreaVersionRepo::finalize(pool, version.id).await.unwrap();

    Fixture {
        package_id: package.id,
        focus_area_id: focus_area.id,
        version_id: version.id,
    }
}

/// Seed a pending session for `jane@example.com`.
pub async fn seed_session(
    pool: &PgPool,
    fixture: &Fixture,
    token: &str,
    form_type: FormType,
    grid_index_filter: Vec<i32>,
) -> FeedbackSession {
    FeedbackSessionRepo::create(
        pool,
        &CreateFeedbackSession {
            token: token.to_string(),
            pin: 4321,
            form_type,
            primary_response_label: "Approve".to_string(),
            secondary_response_label: Some("Revise".to_string()),
            stakeholder_email: "Jane@Example.com".to_string(),
            package_id: fixture.package_id,
            focus_area_id: fixture.focus_area_id,
            focus_area_version_id: fixture.version_id,
            grid_index_filter,
            personal_message: Some("Thanks for taking a look.".to_string()),
        },
    )
    .await
    .unwrap()
}

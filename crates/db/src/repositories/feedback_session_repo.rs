//! Repository for the `feedback_sessions` table.

use sqlx::{PgConnection, PgPool};
use keystone_core::feedback::normalize_email;
use keystone_core::types::DbId;

use crate::models::feedback_session::{
    CreateFeedbackSession, FeedbackSession, PendingFeedbackItem,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, token, pin, form_type, primary_response_label, \
    secondary_response_label, stakeholder_email, package_id, focus_area_id, \
    focus_area_version_id, grid_index_filter, personal_message, created_at, responded_at";

/// Provides lookups and the one-shot state transition for feedback sessions.
pub struct FeedbackSessionRepo;

impl FeedbackSessionRepo {
    /// Insert a new pending session, returning the created row.
    ///
    /// The stakeholder email is stored normalized so pending lookups can
    /// match it exactly.
    pub async fn create(
        pool: &PgPool,
        input: &CreateFeedbackSession,
    ) -> Result<FeedbackSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO feedback_sessions
                (token, pin, form_type, primary_response_label, secondary_response_label,
                 stakeholder_email, package_id, focus_area_id, focus_area_version_id,
                 grid_index_filter, personal_message)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeedbackSession>(&query)
            .bind(&input.token)
            .bind(input.pin)
            .bind(input.form_type.as_str())
            .bind(&input.primary_response_label)
            .bind(&input.secondary_response_label)
            .bind(normalize_email(&input.stakeholder_email))
            .bind(input.package_id)
            .bind(input.focus_area_id)
            .bind(input.focus_area_version_id)
            .bind(&input.grid_index_filter)
            .bind(&input.personal_message)
            .fetch_one(pool)
            .await
    }

    /// Find a session by exact token match, pending or not.
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<FeedbackSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feedback_sessions WHERE token = $1");
        sqlx::query_as::<_, FeedbackSession>(&query)
            .bind(token)
            .fetch_optional(pool)
            .await
    }

    /// Find a session by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<FeedbackSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM feedback_sessions WHERE id = $1");
        sqlx::query_as::<_, FeedbackSession>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the pending sessions addressed to a stakeholder, newest first.
    ///
    /// Responded sessions are never included.
    pub async fn list_pending_for_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Vec<PendingFeedbackItem>, sqlx::Error> {
        sqlx::query_as::<_, PendingFeedbackItem>(
            "SELECT
                s.id AS feedback_session_id,
                s.token,
                s.pin,
                s.form_type,
                p.name AS package_name,
                fa.name AS focus_area_name,
                v.version_number,
                s.created_at
             FROM feedback_sessions s
             JOIN content_packages p ON p.id = s.package_id
             JOIN focus_areas fa ON fa.id = s.focus_area_id
             JOIN focus_area_versions v ON v.id = s.focus_area_version_id
             WHERE s.stakeholder_email = $1
               AND s.responded_at IS NULL
             ORDER BY s.created_at DESC, s.id DESC",
        )
        .bind(normalize_email(email))
        .fetch_all(pool)
        .await
    }

    /// Move a session from pending to responded.
    ///
    /// A single conditional update: it only matches while `responded_at` is
    /// still `NULL` and holds the row lock until the surrounding transaction
    /// ends. Returns `None` when the session is missing or already responded.
    pub async fn mark_responded(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<FeedbackSession>, sqlx::Error> {
        let query = format!(
            "UPDATE feedback_sessions SET responded_at = NOW()
             WHERE id = $1 AND responded_at IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FeedbackSession>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Whether a session row exists at all.
    pub async fn exists(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM feedback_sessions WHERE id = $1)")
                .bind(id)
                .fetch_one(conn)
                .await?;
        Ok(row.0)
    }
}

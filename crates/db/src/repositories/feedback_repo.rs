//! Repositories for the feedback detail tables: `general_feedback`,
//! `itemized_feedback`, and `experience_feedback`.
//!
//! General and itemized rows are only inserted inside the submission
//! transaction, so their create methods take a connection rather than the
//! pool.

use sqlx::{PgConnection, PgPool};
use keystone_core::submission::ItemVerdict;
use keystone_core::types::DbId;

use crate::models::feedback::{ExperienceFeedback, GeneralFeedback, ItemizedFeedback};
use crate::models::feedback_session::FeedbackSession;

/// Column list for general_feedback queries.
const GENERAL_COLUMNS: &str = "id, feedback_session_id, package_id, focus_area_id, \
    focus_area_version_id, body, resolved_at, created_at";

/// Column list for itemized_feedback queries.
const ITEMIZED_COLUMNS: &str = "id, feedback_session_id, package_id, focus_area_id, \
    focus_area_version_id, grid_index, action_verdict, stakeholder_text, created_at";

/// Column list for experience_feedback queries.
const EXPERIENCE_COLUMNS: &str = "id, general_feedback_id, body, created_at";

/// Provides operations for free-text feedback.
pub struct GeneralFeedbackRepo;

impl GeneralFeedbackRepo {
    /// Insert free-text feedback for a session, copying its package, focus
    /// area, and version references.
    pub async fn create(
        conn: &mut PgConnection,
        session: &FeedbackSession,
        body: &str,
    ) -> Result<GeneralFeedback, sqlx::Error> {
        let query = format!(
            "INSERT INTO general_feedback
                (feedback_session_id, package_id, focus_area_id, focus_area_version_id, body)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {GENERAL_COLUMNS}"
        );
        sqlx::query_as::<_, GeneralFeedback>(&query)
            .bind(session.id)
            .bind(session.package_id)
            .bind(session.focus_area_id)
            .bind(session.focus_area_version_id)
            .bind(body)
            .fetch_one(conn)
            .await
    }

    /// Find a general feedback row by its ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<GeneralFeedback>, sqlx::Error> {
        let query = format!("SELECT {GENERAL_COLUMNS} FROM general_feedback WHERE id = $1");
        sqlx::query_as::<_, GeneralFeedback>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List general feedback written for a session.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<GeneralFeedback>, sqlx::Error> {
        let query = format!(
            "SELECT {GENERAL_COLUMNS} FROM general_feedback
             WHERE feedback_session_id = $1
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, GeneralFeedback>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }
}

/// Provides operations for per-record verdicts.
pub struct ItemizedFeedbackRepo;

impl ItemizedFeedbackRepo {
    /// Insert one verdict for a session.
    pub async fn create(
        conn: &mut PgConnection,
        session: &FeedbackSession,
        verdict: &ItemVerdict,
    ) -> Result<ItemizedFeedback, sqlx::Error> {
        let query = format!(
            "INSERT INTO itemized_feedback
                (feedback_session_id, package_id, focus_area_id, focus_area_version_id,
                 grid_index, action_verdict, stakeholder_text)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {ITEMIZED_COLUMNS}"
        );
        sqlx::query_as::<_, ItemizedFeedback>(&query)
            .bind(session.id)
            .bind(session.package_id)
            .bind(session.focus_area_id)
            .bind(session.focus_area_version_id)
            .bind(verdict.grid_index)
            .bind(&verdict.verdict)
            .bind(&verdict.text)
            .fetch_one(conn)
            .await
    }

    /// List verdicts written for a session, ordered by grid index.
    pub async fn list_for_session(
        pool: &PgPool,
        session_id: DbId,
    ) -> Result<Vec<ItemizedFeedback>, sqlx::Error> {
        let query = format!(
            "SELECT {ITEMIZED_COLUMNS} FROM itemized_feedback
             WHERE feedback_session_id = $1
             ORDER BY grid_index ASC"
        );
        sqlx::query_as::<_, ItemizedFeedback>(&query)
            .bind(session_id)
            .fetch_all(pool)
            .await
    }
}

/// Provides operations for submission-experience ratings.
pub struct ExperienceFeedbackRepo;

impl ExperienceFeedbackRepo {
    /// Insert a rating for a general feedback row.
    ///
    /// A second rating for the same row violates
    /// `uq_experience_feedback_general_feedback_id`.
    pub async fn create(
        pool: &PgPool,
        general_feedback_id: DbId,
        body: &str,
    ) -> Result<ExperienceFeedback, sqlx::Error> {
        let query = format!(
            "INSERT INTO experience_feedback (general_feedback_id, body)
             VALUES ($1, $2)
             RETURNING {EXPERIENCE_COLUMNS}"
        );
        sqlx::query_as::<_, ExperienceFeedback>(&query)
            .bind(general_feedback_id)
            .bind(body)
            .fetch_one(pool)
            .await
    }

    /// Find the rating attached to a general feedback row, if any.
    pub async fn find_for_general_feedback(
        pool: &PgPool,
        general_feedback_id: DbId,
    ) -> Result<Option<ExperienceFeedback>, sqlx::Error> {
        let query = format!(
            "SELECT {EXPERIENCE_COLUMNS} FROM experience_feedback WHERE general_feedback_id = $1"
        );
        sqlx::query_as::<_, ExperienceFeedback>(&query)
            .bind(general_feedback_id)
            .fetch_optional(pool)
            .await
    }
}

//! Feedback detail models: general, itemized, and experience feedback.
//!
//! General and itemized rows repeat the package, focus area, and version ids
//! of their session so reporting queries need no joins.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use keystone_core::types::{DbId, Timestamp};

/// A row from the `general_feedback` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GeneralFeedback {
    pub id: DbId,
    pub feedback_session_id: DbId,
    pub package_id: DbId,
    pub focus_area_id: DbId,
    pub focus_area_version_id: DbId,
    pub body: String,
    pub resolved_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A row from the `itemized_feedback` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ItemizedFeedback {
    pub id: DbId,
    pub feedback_session_id: DbId,
    pub package_id: DbId,
    pub focus_area_id: DbId,
    pub focus_area_version_id: DbId,
    pub grid_index: i32,
    pub action_verdict: String,
    pub stakeholder_text: Option<String>,
    pub created_at: Timestamp,
}

/// A row from the `experience_feedback` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ExperienceFeedback {
    pub id: DbId,
    pub general_feedback_id: DbId,
    pub body: String,
    pub created_at: Timestamp,
}

/// Request body for rating the submission experience.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateExperienceFeedback {
    pub general_feedback_id: DbId,
    pub body: String,
}

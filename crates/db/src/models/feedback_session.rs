//! Feedback session models.
//!
//! A feedback session is one dispatched, token-addressable request for a
//! stakeholder's opinion on a focus-area version. `responded_at` is its only
//! state: `NULL` while pending, set once when the stakeholder submits.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use keystone_core::error::CoreError;
use keystone_core::feedback::FormType;
use keystone_core::submission::SessionTerms;
use keystone_core::types::{DbId, Timestamp};

/// A row from the `feedback_sessions` table.
///
/// The opaque `token` and the `pin` are skipped on serialization; they are
/// only handed out through the pending-request index.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FeedbackSession {
    pub id: DbId,
    #[serde(skip_serializing)]
    pub token: String,
    #[serde(skip_serializing)]
    pub pin: i32,
    pub form_type: String,
    pub primary_response_label: String,
    pub secondary_response_label: Option<String>,
    pub stakeholder_email: String,
    pub package_id: DbId,
    pub focus_area_id: DbId,
    pub focus_area_version_id: DbId,
    pub grid_index_filter: Vec<i32>,
    pub personal_message: Option<String>,
    pub created_at: Timestamp,
    pub responded_at: Option<Timestamp>,
}

impl FeedbackSession {
    pub fn is_pending(&self) -> bool {
        self.responded_at.is_none()
    }

    /// Parse the stored form type.
    pub fn form_type(&self) -> Result<FormType, CoreError> {
        FormType::try_from(self.form_type.as_str())
    }

    /// Form type and labels used to validate a submission.
    pub fn terms(&self) -> Result<SessionTerms<'_>, CoreError> {
        Ok(SessionTerms {
            form_type: self.form_type()?,
            primary_label: &self.primary_response_label,
            secondary_label: self.secondary_response_label.as_deref(),
        })
    }
}

/// DTO for creating a feedback session (dispatch side).
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeedbackSession {
    pub token: String,
    pub pin: i32,
    pub form_type: FormType,
    pub primary_response_label: String,
    pub secondary_response_label: Option<String>,
    pub stakeholder_email: String,
    pub package_id: DbId,
    pub focus_area_id: DbId,
    pub focus_area_version_id: DbId,
    #[serde(default)]
    pub grid_index_filter: Vec<i32>,
    pub personal_message: Option<String>,
}

/// One outstanding request in a stakeholder's worklist.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PendingFeedbackItem {
    pub feedback_session_id: DbId,
    pub token: String,
    pub pin: i32,
    pub form_type: String,
    pub package_name: String,
    pub focus_area_name: String,
    pub version_number: i32,
    pub created_at: Timestamp,
}

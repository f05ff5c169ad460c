//! Builds the feedback form a stakeholder sees for a session.

use indexmap::IndexMap;
use keystone_core::error::CoreError;
use keystone_core::feedback::FormLayout;
use keystone_core::types::{DbId, Timestamp};
use keystone_db::models::content::ContentRecord;
use keystone_db::models::feedback_session::FeedbackSession;
use keystone_db::repositories::{ContentRecordRepo, FocusAreaVersionRepo};
use keystone_db::DbPool;
use serde::Serialize;

use crate::error::{AppError, AppResult};

/// What the form endpoint returns for a session.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FeedbackPage {
    /// The session is pending; render the form.
    Form(FormView),
    /// The session was already responded to. Terminal.
    AlreadySubmitted { responded_at: Timestamp },
}

/// Everything needed to render a pending session's form.
#[derive(Debug, Clone, Serialize)]
pub struct FormView {
    pub feedback_session_id: DbId,
    pub package_name: String,
    pub package_summary: Option<String>,
    pub focus_area_name: String,
    pub version_number: i32,
    pub personal_message: Option<String>,
    pub stakeholder_email: String,
    pub layout: FormLayout,
    pub records: RecordSet,
}

/// The records under review, or an explicit empty state.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordSet {
    Available { items: Vec<RecordView> },
    Empty,
}

/// One record as shown on the form.
#[derive(Debug, Clone, Serialize)]
pub struct RecordView {
    /// Identifier verdicts are keyed by.
    pub grid_index: i32,
    pub display_order: i32,
    pub properties: IndexMap<String, String>,
}

impl From<&ContentRecord> for RecordView {
    fn from(record: &ContentRecord) -> Self {
        Self {
            grid_index: record.grid_index,
            display_order: record.display_order,
            properties: record.property_bag(),
        }
    }
}

impl RecordSet {
    fn from_records(records: &[ContentRecord]) -> Self {
        if records.is_empty() {
            RecordSet::Empty
        } else {
            RecordSet::Available {
                items: records.iter().map(RecordView::from).collect(),
            }
        }
    }
}

/// Project a session into its page. Never mutates state.
pub async fn project(pool: &DbPool, session: &FeedbackSession) -> AppResult<FeedbackPage> {
    if let Some(responded_at) = session.responded_at {
        return Ok(FeedbackPage::AlreadySubmitted { responded_at });
    }

    let form_type = session
        .form_type()
        .map_err(|e| AppError::Core(CoreError::Internal(e.to_string())))?;

    let summary = FocusAreaVersionRepo::find_summary(pool, session.focus_area_version_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "FocusAreaVersion",
            id: session.focus_area_version_id,
        }))?;

    let records = ContentRecordRepo::list_for_version(
        pool,
        session.focus_area_version_id,
        &session.grid_index_filter,
    )
    .await?;

    Ok(FeedbackPage::Form(FormView {
        feedback_session_id: session.id,
        package_name: summary.package_name,
        package_summary: summary.package_summary,
        focus_area_name: summary.focus_area_name,
        version_number: summary.version_number,
        personal_message: session.personal_message.clone(),
        stakeholder_email: session.stakeholder_email.clone(),
        layout: FormLayout::for_session(
            form_type,
            &session.primary_response_label,
            session.secondary_response_label.as_deref(),
        ),
        records: RecordSet::from_records(&records),
    }))
}

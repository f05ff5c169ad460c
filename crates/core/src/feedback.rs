//! Feedback session constants, form types, and projection rules.
//!
//! A feedback session is either `general` (one free-text answer) or
//! `itemized` (a verdict per content record plus optional free text). The
//! helpers here decide which layout a session gets and check the small
//! pieces of stakeholder input that are not part of a submission.

use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Form type value for a single free-text response.
pub const FORM_TYPE_GENERAL: &str = "general";

/// Form type value for per-record verdicts plus optional free text.
pub const FORM_TYPE_ITEMIZED: &str = "itemized";

/// All valid form type values.
pub const VALID_FORM_TYPES: &[&str] = &[FORM_TYPE_GENERAL, FORM_TYPE_ITEMIZED];

/// Maximum length for any stakeholder-supplied free text.
pub const MAX_FREE_TEXT_LENGTH: usize = 10_000;

/// Maximum length for an experience rating comment.
pub const MAX_EXPERIENCE_TEXT_LENGTH: usize = 2_000;

/// Event type published after a submission commits.
pub const EVENT_FEEDBACK_SUBMITTED: &str = "feedback.submitted";

/* --------------------------------------------------------------------------
Form type
-------------------------------------------------------------------------- */

/// Which of the two form layouts a session presents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormType {
    General,
    Itemized,
}

impl FormType {
    pub fn as_str(self) -> &'static str {
        match self {
            FormType::General => FORM_TYPE_GENERAL,
            FormType::Itemized => FORM_TYPE_ITEMIZED,
        }
    }
}

impl std::fmt::Display for FormType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for FormType {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            FORM_TYPE_GENERAL => Ok(FormType::General),
            FORM_TYPE_ITEMIZED => Ok(FormType::Itemized),
            other => Err(CoreError::Validation(format!(
                "Invalid form type '{other}'. Must be one of: {}",
                VALID_FORM_TYPES.join(", ")
            ))),
        }
    }
}

/* --------------------------------------------------------------------------
Layout
-------------------------------------------------------------------------- */

/// The form variant shown to the stakeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FormLayout {
    /// One free-text input, no per-record actions.
    General,
    /// Per-record action buttons plus an optional overall comment.
    Itemized {
        primary_label: String,
        secondary_label: Option<String>,
    },
}

impl FormLayout {
    /// Select the layout for a session from its stored form type and labels.
    ///
    /// A blank secondary label is treated as absent.
    pub fn for_session(form_type: FormType, primary: &str, secondary: Option<&str>) -> Self {
        match form_type {
            FormType::General => FormLayout::General,
            FormType::Itemized => FormLayout::Itemized {
                primary_label: primary.trim().to_string(),
                secondary_label: secondary
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            },
        }
    }
}

/* --------------------------------------------------------------------------
Stakeholder input helpers
-------------------------------------------------------------------------- */

/// Normalize a stakeholder email for lookups (trimmed, lowercased).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a stakeholder email address used as a lookup key.
pub fn validate_stakeholder_email(email: &str) -> Result<(), CoreError> {
    let normalized = normalize_email(email);
    if normalized.is_empty() {
        return Err(CoreError::Validation(
            "Stakeholder email must not be empty".to_string(),
        ));
    }
    if !normalized.validate_email() {
        return Err(CoreError::Validation(format!(
            "Invalid stakeholder email '{normalized}'"
        )));
    }
    Ok(())
}

/// Validate the optional post-submission experience comment.
pub fn validate_experience_text(text: &str) -> Result<(), CoreError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Experience feedback must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_EXPERIENCE_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Experience feedback exceeds maximum length of {MAX_EXPERIENCE_TEXT_LENGTH} characters"
        )));
    }
    Ok(())
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

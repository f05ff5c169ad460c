//! Submission payloads, validation, and outcomes for the feedback workflow.
//!
//! Validation is pure: it takes the terms stored on the session (form type
//! and response labels) and the stakeholder's payload, and returns the
//! cleaned rows to persist. The idempotency guard is not checked here; it
//! lives in the database transition and always runs first.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::feedback::{FormType, MAX_FREE_TEXT_LENGTH};
use crate::types::DbId;

/* --------------------------------------------------------------------------
Payload
-------------------------------------------------------------------------- */

/// A stakeholder's decision on a single record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAction {
    /// The chosen response label. Empty means "no decision".
    #[serde(default)]
    pub verdict: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl ItemAction {
    pub fn verdict(verdict: impl Into<String>) -> Self {
        Self {
            verdict: verdict.into(),
            text: None,
        }
    }
}

/// The body of a submit request.
///
/// `actions` is keyed by grid index, which JSON carries as string keys
/// (`{"1": {"verdict": "Approve"}}`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmissionInput {
    /// Form type the client rendered. Optional; when present it must match
    /// the session.
    #[serde(default)]
    pub form_type: Option<FormType>,
    #[serde(default)]
    pub free_text: Option<String>,
    #[serde(default)]
    pub actions: BTreeMap<i32, ItemAction>,
}

/// The parts of a session that govern what a valid submission looks like.
#[derive(Debug, Clone, Copy)]
pub struct SessionTerms<'a> {
    pub form_type: FormType,
    pub primary_label: &'a str,
    pub secondary_label: Option<&'a str>,
}

impl SessionTerms<'_> {
    fn accepts_verdict(&self, verdict: &str) -> bool {
        verdict == self.primary_label.trim()
            || self
                .secondary_label
                .map(str::trim)
                .is_some_and(|s| !s.is_empty() && s == verdict)
    }
}

/// One itemized row ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemVerdict {
    pub grid_index: i32,
    pub verdict: String,
    pub text: Option<String>,
}

/// A submission that passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedSubmission {
    /// Trimmed free text, `None` when blank.
    pub free_text: Option<String>,
    /// Verdicts to persist, ordered by grid index. Blank verdicts are dropped.
    pub verdicts: Vec<ItemVerdict>,
}

/// A validation failure tied to the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/* --------------------------------------------------------------------------
Validation
-------------------------------------------------------------------------- */

fn clean_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn check_length(field: &'static str, text: &Option<String>) -> Result<(), FieldError> {
    match text {
        Some(t) if t.chars().count() > MAX_FREE_TEXT_LENGTH => Err(FieldError::new(
            field,
            format!("Text exceeds maximum length of {MAX_FREE_TEXT_LENGTH} characters"),
        )),
        _ => Ok(()),
    }
}

/// Validate a submission payload against the session's terms.
///
/// - A declared form type must match the session's.
/// - General forms require non-empty free text and carry no verdicts.
/// - Itemized forms accept empty free text and an empty action map.
///   Blank verdicts are skipped; any other verdict must be one of the
///   session's response labels.
pub fn validate_submission(
    terms: &SessionTerms<'_>,
    input: &SubmissionInput,
) -> Result<ValidatedSubmission, FieldError> {
    if let Some(declared) = input.form_type {
        if declared != terms.form_type {
            return Err(FieldError::new(
                "form_type",
                format!(
                    "Form type '{declared}' does not match this request ('{}')",
                    terms.form_type
                ),
            ));
        }
    }

    let free_text = clean_text(input.free_text.as_deref());
    check_length("free_text", &free_text)?;

    let mut verdicts = Vec::new();
    for (&grid_index, action) in &input.actions {
        let verdict = action.verdict.trim();
        if verdict.is_empty() {
            continue;
        }
        if terms.form_type == FormType::General {
            return Err(FieldError::new(
                "actions",
                "This request does not accept per-record responses",
            ));
        }
        if !terms.accepts_verdict(verdict) {
            return Err(FieldError::new(
                "actions",
                format!("Unknown response '{verdict}' for record {grid_index}"),
            ));
        }
        let text = clean_text(action.text.as_deref());
        check_length("actions", &text)?;
        verdicts.push(ItemVerdict {
            grid_index,
            verdict: verdict.to_string(),
            text,
        });
    }

    if terms.form_type == FormType::General && free_text.is_none() {
        return Err(FieldError::new("free_text", "Feedback text is required"));
    }

    Ok(ValidatedSubmission {
        free_text,
        verdicts,
    })
}

/* --------------------------------------------------------------------------
Outcome
-------------------------------------------------------------------------- */

/// What happened to a submit call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmissionResult {
    /// The session moved to Responded and all detail rows were written.
    Success {
        general_feedback_id: Option<DbId>,
        itemized_count: usize,
    },
    /// The session had already been responded to. Nothing was written.
    AlreadySubmitted,
    /// The payload was rejected. Nothing was written.
    ValidationError { field: String, message: String },
    /// The transaction could not commit and was rolled back.
    PersistenceFailure,
}

impl SubmissionResult {
    /// Only persistence failures may be retried; every other outcome is final.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SubmissionResult::PersistenceFailure)
    }
}

impl From<FieldError> for SubmissionResult {
    fn from(err: FieldError) -> Self {
        SubmissionResult::ValidationError {
            field: err.field.to_string(),
            message: err.message,
        }
    }
}

/// Serialized shape of a [`SubmissionResult`] with its retry hint.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReport {
    #[serde(flatten)]
    pub result: SubmissionResult,
    pub retryable: bool,
}

impl From<SubmissionResult> for SubmissionReport {
    fn from(result: SubmissionResult) -> Self {
        let retryable = result.is_retryable();
        Self { result, retryable }
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn itemized_terms() -> SessionTerms<'static> {
        SessionTerms {
            form_type: FormType::Itemized,
            primary_label: "Approve",
            secondary_label: Some("Revise"),
        }
    }

    fn general_terms() -> SessionTerms<'static> {
        SessionTerms {
            form_type: FormType::General,
            primary_label: "Approve",
            secondary_label: None,
        }
    }

    fn input(free_text: Option<&str>, actions: &[(i32, &str)]) -> SubmissionInput {
        SubmissionInput {
            form_type: None,
            free_text: free_text.map(str::to_string),
            actions: actions
                .iter()
                .map(|(g, v)| (*g, ItemAction::verdict(*v)))
                .collect(),
        }
    }

    #[test]
    fn general_requires_free_text() {
        let err = validate_submission(&general_terms(), &input(None, &[])).unwrap_err();
        assert_eq!(err.field, "free_text");

        let err = validate_submission(&general_terms(), &input(Some("   "), &[])).unwrap_err();
        assert_eq!(err.field, "free_text");
    }

    #[test]
    fn general_with_text_is_trimmed() {
        let ok = validate_submission(&general_terms(), &input(Some("  Looks good \n"), &[]))
            .unwrap();
        assert_eq!(ok.free_text.as_deref(), Some("Looks good"));
        assert!(ok.verdicts.is_empty());
    }

    #[test]
    fn general_rejects_verdicts() {
        let err = validate_submission(&general_terms(), &input(Some("text"), &[(1, "Approve")]))
            .unwrap_err();
        assert_eq!(err.field, "actions");
    }

    #[test]
    fn itemized_accepts_empty_payload() {
        let ok = validate_submission(&itemized_terms(), &input(None, &[])).unwrap();
        assert_eq!(ok, ValidatedSubmission::default());
    }

    #[test]
    fn itemized_skips_blank_verdicts() {
        let ok = validate_submission(&itemized_terms(), &input(None, &[(1, "Approve"), (2, "")]))
            .unwrap();
        assert_eq!(
            ok.verdicts,
            vec![ItemVerdict {
                grid_index: 1,
                verdict: "Approve".to_string(),
                text: None,
            }]
        );
        assert!(ok.free_text.is_none());
    }

    #[test]
    fn itemized_accepts_secondary_label() {
        let ok = validate_submission(&itemized_terms(), &input(None, &[(7, "Revise")])).unwrap();
        assert_eq!(ok.verdicts[0].grid_index, 7);
        assert_eq!(ok.verdicts[0].verdict, "Revise");
    }

    #[test]
    fn itemized_rejects_unknown_verdict() {
        let err = validate_submission(&itemized_terms(), &input(None, &[(1, "Maybe")]))
            .unwrap_err();
        assert_eq!(err.field, "actions");
    }

    #[test]
    fn itemized_without_secondary_rejects_it() {
        let terms = SessionTerms {
            secondary_label: None,
            ..itemized_terms()
        };
        assert!(validate_submission(&terms, &input(None, &[(1, "Revise")])).is_err());
    }

    #[test]
    fn mismatched_declared_form_type_is_rejected() {
        let mut payload = input(Some("text"), &[]);
        payload.form_type = Some(FormType::Itemized);
        let err = validate_submission(&general_terms(), &payload).unwrap_err();
        assert_eq!(err.field, "form_type");
    }

    #[test]
    fn overlong_free_text_is_rejected() {
        let long = "a".repeat(MAX_FREE_TEXT_LENGTH + 1);
        let err = validate_submission(&itemized_terms(), &input(Some(&long), &[])).unwrap_err();
        assert_eq!(err.field, "free_text");
    }

    #[test]
    fn item_text_is_kept_and_trimmed() {
        let mut payload = input(None, &[]);
        payload.actions.insert(
            3,
            ItemAction {
                verdict: "Revise".to_string(),
                text: Some("  wrong figure  ".to_string()),
            },
        );
        let ok = validate_submission(&itemized_terms(), &payload).unwrap();
        assert_eq!(ok.verdicts[0].text.as_deref(), Some("wrong figure"));
    }

    #[test]
    fn actions_deserialize_from_string_keys() {
        let payload: SubmissionInput = serde_json::from_str(
            r#"{"actions": {"1": {"verdict": "Approve"}, "2": {"verdict": ""}}}"#,
        )
        .unwrap();
        assert_eq!(payload.actions.len(), 2);
        assert_eq!(payload.actions[&1].verdict, "Approve");
        assert!(payload.free_text.is_none());
    }

    #[test]
    fn only_persistence_failure_is_retryable() {
        assert!(SubmissionResult::PersistenceFailure.is_retryable());
        assert!(!SubmissionResult::AlreadySubmitted.is_retryable());
        assert!(!SubmissionResult::ValidationError {
            field: "free_text".into(),
            message: "required".into(),
        }
        .is_retryable());
    }

    #[test]
    fn report_serializes_status_and_retry_hint() {
        let report = SubmissionReport::from(SubmissionResult::Success {
            general_feedback_id: Some(9),
            itemized_count: 1,
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["general_feedback_id"], 9);
        assert_eq!(json["retryable"], false);

        let json = serde_json::to_value(SubmissionReport::from(
            SubmissionResult::AlreadySubmitted,
        ))
        .unwrap();
        assert_eq!(json["status"], "already_submitted");
    }

    #[test]
    fn field_error_converts_to_validation_outcome() {
        let result = SubmissionResult::from(FieldError::new("free_text", "required"));
        assert_matches!(result, SubmissionResult::ValidationError { ref field, .. } if field == "free_text");
    }
}

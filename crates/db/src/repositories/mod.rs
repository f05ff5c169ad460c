//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument, or `&mut PgConnection` when the
//! call must join an open transaction.

pub mod content_repo;
pub mod feedback_repo;
pub mod feedback_session_repo;
pub mod submission_repo;

pub use content_repo::{ContentPackageRepo, ContentRecordRepo, FocusAreaRepo, FocusAreaVersionRepo};
pub use feedback_repo::{ExperienceFeedbackRepo, GeneralFeedbackRepo, ItemizedFeedbackRepo};
pub use feedback_session_repo::FeedbackSessionRepo;
pub use submission_repo::{CommittedSubmission, FeedbackSubmissionRepo, SubmissionOutcome};

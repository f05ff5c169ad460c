//! Integration tests for the feedback submission transaction.
//!
//! Exercises the repository layer against a real database to verify that:
//! - A session moves from pending to responded exactly once
//! - Detail rows are written only alongside that transition
//! - Rejected payloads leave no trace and keep the session pending
//! - A failed detail insert rolls back the status transition
//! - Concurrent duplicate submissions produce a single winner

use assert_matches::assert_matches;
use sqlx::PgPool;
use keystone_core::feedback::FormType;
use keystone_core::submission::{ItemAction, SubmissionInput};
use keystone_db::models::content::{CreateContentPackage, CreateContentRecord, CreateFocusArea};
use keystone_db::models::feedback_session::{CreateFeedbackSession, FeedbackSession};
use keystone_db::repositories::{
    ContentPackageRepo, ContentRecordRepo, FeedbackSessionRepo, FeedbackSubmissionRepo,
    FocusAreaRepo, FocusAreaVersionRepo, GeneralFeedbackRepo, ItemizedFeedbackRepo,
    SubmissionOutcome,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// IDs of a package → focus area → version hierarchy.
struct Fixture {
    package_id: i64,
    focus_area_id: i64,
    version_id: i64,
}

async fn setup_version(pool: &PgPool, grid_indexes: &[i32]) -> Fixture {
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

    for (i, grid_index) in grid_indexes.iter().enumerate() {
        ContentRecordRepo::create(
            pool,
            &CreateContentRecord {
                focus_area_version_id: version.id,
                display_order: i as i32,
                grid_index: *grid_index,
                properties: vec![("Finding".to_string(), format!("Item {grid_index}"))],
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

async fn new_session(
    pool: &PgPool,
    fixture: &Fixture,
    token: &str,
    form_type: FormType,
) -> FeedbackSession {
    FeedbackSessionRepo::create(
        pool,
        &CreateFeedbackSession {
            token: token.to_string(),
            pin: 1234,
            form_type,
            primary_response_label: "Approve".to_string(),
            secondary_response_label: Some("Revise".to_string()),
            stakeholder_email: "stakeholder@example.com".to_string(),
            package_id: fixture.package_id,
            focus_area_id: fixture.focus_area_id,
            focus_area_version_id: fixture.version_id,
            grid_index_filter: vec![],
            personal_message: Some("Please review by Friday".to_string()),
        },
    )
    .await
    .unwrap()
}

fn payload(free_text: Option<&str>, actions: &[(i32, &str)]) -> SubmissionInput {
    SubmissionInput {
        form_type: None,
        free_text: free_text.map(str::to_string),
        actions: actions
            .iter()
            .map(|(g, v)| (*g, ItemAction::verdict(*v)))
            .collect(),
    }
}

async fn detail_counts(pool: &PgPool, session_id: i64) -> (usize, usize) {
    let general = GeneralFeedbackRepo::list_for_session(pool, session_id)
        .await
        .unwrap();
    let itemized = ItemizedFeedbackRepo::list_for_session(pool, session_id)
        .await
        .unwrap();
    (general.len(), itemized.len())
}

// ---------------------------------------------------------------------------
// Test: itemized scenario writes one verdict and skips the blank one
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn itemized_submission_skips_blank_verdicts(pool: PgPool) {
    let fixture = setup_version(&pool, &[1, 2]).await;
    let session = new_session(&pool, &fixture, "abc", FormType::Itemized).await;

    let outcome = FeedbackSubmissionRepo::submit(
        &pool,
        session.id,
        &payload(None, &[(1, "Approve"), (2, "")]),
    )
    .await
    .unwrap();

    let committed = assert_matches!(outcome, SubmissionOutcome::Committed(c) => c);
    assert!(committed.general.is_none());
    assert_eq!(committed.itemized.len(), 1);
    assert!(committed.session.responded_at.is_some());

    let rows = ItemizedFeedbackRepo::list_for_session(&pool, session.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].grid_index, 1);
    assert_eq!(rows[0].action_verdict, "Approve");
    assert_eq!(rows[0].package_id, fixture.package_id);
    assert_eq!(rows[0].focus_area_version_id, fixture.version_id);

    assert_eq!(detail_counts(&pool, session.id).await, (0, 1));

    let reloaded = FeedbackSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.responded_at.is_some());
}

// ---------------------------------------------------------------------------
// Test: a second submission is refused and changes nothing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn second_submission_is_already_responded(pool: PgPool) {
    let fixture = setup_version(&pool, &[1, 2]).await;
    let session = new_session(&pool, &fixture, "abc", FormType::Itemized).await;

    FeedbackSubmissionRepo::submit(&pool, session.id, &payload(None, &[(1, "Approve")]))
        .await
        .unwrap();
    let first_responded_at = FeedbackSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap()
        .responded_at;

    let outcome = FeedbackSubmissionRepo::submit(
        &pool,
        session.id,
        &payload(Some("changed my mind"), &[(1, "Revise"), (2, "Approve")]),
    )
    .await
    .unwrap();
    assert_matches!(outcome, SubmissionOutcome::AlreadyResponded);

    assert_eq!(detail_counts(&pool, session.id).await, (0, 1));
    let reloaded = FeedbackSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.responded_at, first_responded_at);
}

// ---------------------------------------------------------------------------
// Test: the guard runs before validation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn responded_session_reports_guard_even_for_invalid_payload(pool: PgPool) {
    let fixture = setup_version(&pool, &[1]).await;
    let session = new_session(&pool, &fixture, "gen-1", FormType::General).await;

    FeedbackSubmissionRepo::submit(&pool, session.id, &payload(Some("Fine by me"), &[]))
        .await
        .unwrap();

    // Empty text would fail validation on a pending General session.
    let outcome = FeedbackSubmissionRepo::submit(&pool, session.id, &payload(None, &[]))
        .await
        .unwrap();
    assert_matches!(outcome, SubmissionOutcome::AlreadyResponded);
}

// ---------------------------------------------------------------------------
// Test: general form without text is rejected and the session stays pending
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn general_without_text_is_rejected_without_writes(pool: PgPool) {
    let fixture = setup_version(&pool, &[1]).await;
    let session = new_session(&pool, &fixture, "gen-2", FormType::General).await;

    let outcome = FeedbackSubmissionRepo::submit(&pool, session.id, &payload(Some("  "), &[]))
        .await
        .unwrap();
    let field_error = assert_matches!(outcome, SubmissionOutcome::Rejected(e) => e);
    assert_eq!(field_error.field, "free_text");

    assert_eq!(detail_counts(&pool, session.id).await, (0, 0));
    let reloaded = FeedbackSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.is_pending(), "rollback must keep the session pending");

    // The stakeholder can still correct and resubmit.
    let outcome = FeedbackSubmissionRepo::submit(&pool, session.id, &payload(Some("Agreed"), &[]))
        .await
        .unwrap();
    assert_matches!(outcome, SubmissionOutcome::Committed(_));
    assert_eq!(detail_counts(&pool, session.id).await, (1, 0));
}

// ---------------------------------------------------------------------------
// Test: itemized form with nothing filled in only closes the session
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_itemized_submission_only_closes_session(pool: PgPool) {
    let fixture = setup_version(&pool, &[1, 2, 3]).await;
    let session = new_session(&pool, &fixture, "item-empty", FormType::Itemized).await;

    let outcome = FeedbackSubmissionRepo::submit(&pool, session.id, &payload(None, &[]))
        .await
        .unwrap();
    assert_matches!(outcome, SubmissionOutcome::Committed(_));

    assert_eq!(detail_counts(&pool, session.id).await, (0, 0));
    let reloaded = FeedbackSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert!(!reloaded.is_pending());
}

// ---------------------------------------------------------------------------
// Test: itemized form with free text writes both kinds of rows
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn itemized_with_free_text_writes_general_row(pool: PgPool) {
    let fixture = setup_version(&pool, &[1, 2]).await;
    let session = new_session(&pool, &fixture, "item-text", FormType::Itemized).await;

    let outcome = FeedbackSubmissionRepo::submit(
        &pool,
        session.id,
        &payload(Some("Overall solid"), &[(1, "Approve"), (2, "Revise")]),
    )
    .await
    .unwrap();
    let committed = assert_matches!(outcome, SubmissionOutcome::Committed(c) => c);
    let general = committed.general.expect("general feedback row");
    assert_eq!(general.body, "Overall solid");
    assert_eq!(general.feedback_session_id, session.id);
    assert_eq!(general.focus_area_id, fixture.focus_area_id);
    assert!(general.resolved_at.is_none());

    assert_eq!(detail_counts(&pool, session.id).await, (1, 2));
}

// ---------------------------------------------------------------------------
// Test: unknown session id
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_session_is_not_found(pool: PgPool) {
    let outcome = FeedbackSubmissionRepo::submit(&pool, 999_999, &payload(Some("x"), &[]))
        .await
        .unwrap();
    assert_matches!(outcome, SubmissionOutcome::SessionNotFound);
}

// ---------------------------------------------------------------------------
// Test: concurrent duplicate submissions produce exactly one winner
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn concurrent_submissions_commit_once(pool: PgPool) {
    let fixture = setup_version(&pool, &[1, 2]).await;
    let session = new_session(&pool, &fixture, "race", FormType::Itemized).await;

    let first_input = payload(Some("first"), &[(1, "Approve")]);
    let second_input = payload(Some("second"), &[(2, "Revise")]);

    let (a, b) = tokio::join!(
        FeedbackSubmissionRepo::submit(&pool, session.id, &first_input),
        FeedbackSubmissionRepo::submit(&pool, session.id, &second_input),
    );
    let outcomes = [a.unwrap(), b.unwrap()];

    let committed = outcomes
        .iter()
        .filter(|o| matches!(o, SubmissionOutcome::Committed(_)))
        .count();
    let refused = outcomes
        .iter()
        .filter(|o| matches!(o, SubmissionOutcome::AlreadyResponded))
        .count();
    assert_eq!(committed, 1, "exactly one submission must win");
    assert_eq!(refused, 1, "the other must observe the guard");

    assert_eq!(detail_counts(&pool, session.id).await, (1, 1));
}

// ---------------------------------------------------------------------------
// Test: detail rows never exist for a pending session
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn pending_sessions_have_no_detail_rows(pool: PgPool) {
    let fixture = setup_version(&pool, &[1]).await;
    let general = new_session(&pool, &fixture, "p-gen", FormType::General).await;
    let itemized = new_session(&pool, &fixture, "p-item", FormType::Itemized).await;

    // Rejected attempts on both.
    FeedbackSubmissionRepo::submit(&pool, general.id, &payload(None, &[]))
        .await
        .unwrap();
    FeedbackSubmissionRepo::submit(&pool, itemized.id, &payload(None, &[(1, "Maybe")]))
        .await
        .unwrap();

    for id in [general.id, itemized.id] {
        let session = FeedbackSessionRepo::find_by_id(&pool, id)
            .await
            .unwrap()
            .unwrap();
        assert!(session.is_pending());
        assert_eq!(detail_counts(&pool, id).await, (0, 0));
    }

    let package = ContentPackageRepo::find_by_id(&pool, fixture.package_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(package.name, "Q3 Risk Review");
}

// ---------------------------------------------------------------------------
// Test: a failed detail insert rolls back the whole submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_detail_insert_rolls_back_everything(pool: PgPool) {
    let fixture = setup_version(&pool, &[1, 2]).await;
    let session = new_session(&pool, &fixture, "abc", FormType::Itemized).await;

    sqlx::query(
        "CREATE FUNCTION reject_itemized_insert() RETURNS trigger AS $$
         BEGIN
             RAISE EXCEPTION 'itemized writes disabled';
         END;
         $$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE TRIGGER reject_itemized_insert BEFORE INSERT ON itemized_feedback
         FOR EACH ROW EXECUTE FUNCTION reject_itemized_insert()",
    )
    .execute(&pool)
    .await
    .unwrap();

    // The general row is written first, then the itemized insert fails.
    let result = FeedbackSubmissionRepo::submit(
        &pool,
        session.id,
        &payload(Some("Overall fine"), &[(1, "Approve")]),
    )
    .await;
    assert_matches!(result, Err(sqlx::Error::Database(_)));

    assert_eq!(detail_counts(&pool, session.id).await, (0, 0));
    let reloaded = FeedbackSessionRepo::find_by_id(&pool, session.id)
        .await
        .unwrap()
        .unwrap();
    assert!(reloaded.is_pending());
}

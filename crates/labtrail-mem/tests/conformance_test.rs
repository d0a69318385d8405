//! Conformance suite run against the in-memory backend.
//!
//! Every scenario in `labtrail_core::conformance` must pass here exactly as
//! it does against the PostgreSQL backend; this is what keeps the two
//! implementations from drifting apart.

use labtrail_core::conformance;
use labtrail_mem::MemDatabase;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

#[tokio::test]
async fn test_project_cascade() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_project_cascade(&db.handle())
        .await
        .expect("project cascade scenario failed");
}

#[tokio::test]
async fn test_experiment_cascade() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_experiment_cascade(&db.handle())
        .await
        .expect("experiment cascade scenario failed");
}

#[tokio::test]
async fn test_note_cascade() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_note_cascade(&db.handle())
        .await
        .expect("note cascade scenario failed");
}

#[tokio::test]
async fn test_idempotent_absence() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_idempotent_absence(&db.handle())
        .await
        .expect("idempotent absence scenario failed");
}

#[tokio::test]
async fn test_partial_update_merge() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_partial_update_merge(&db.handle())
        .await
        .expect("partial update merge scenario failed");
}

#[tokio::test]
async fn test_no_timestamp_bubble_up() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_no_timestamp_bubble_up(&db.handle())
        .await
        .expect("timestamp bubble-up scenario failed");
}

#[tokio::test]
async fn test_owner_collaborator_union() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_owner_collaborator_union(&db.handle())
        .await
        .expect("owner/collaborator union scenario failed");
}

#[tokio::test]
async fn test_collaborator_lifecycle() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_collaborator_lifecycle(&db.handle())
        .await
        .expect("collaborator lifecycle scenario failed");
}

#[tokio::test]
async fn test_search_rules() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_search_rules(&db.handle())
        .await
        .expect("search rules scenario failed");
}

#[tokio::test]
async fn test_referential_integrity() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_referential_integrity(&db.handle())
        .await
        .expect("referential integrity scenario failed");
}

#[tokio::test]
async fn test_attachment_payload() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_attachment_payload(&db.handle())
        .await
        .expect("attachment payload scenario failed");
}

#[tokio::test]
async fn test_user_deletion_guard() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_user_deletion_guard(&db.handle())
        .await
        .expect("user deletion guard scenario failed");
}

#[tokio::test]
async fn test_full_suite_on_one_store() {
    init_logging();
    let db = MemDatabase::new();
    conformance::check_all(&db.handle())
        .await
        .expect("full conformance suite failed on a single store");
}

//! Integration tests for CRUD lifecycle, partial updates, and referential
//! integrity enforcement.
//!
//! **IMPORTANT**: These tests require a running PostgreSQL instance
//! reachable via `DATABASE_URL` (or the fixture default). Run with
//! `cargo test -- --ignored`.

use labtrail_core::conformance;
use labtrail_db::test_fixtures::TestDatabase;
use labtrail_db::{
    CreateProjectRequest, CreateUserRequest, ProjectRepository, UpdateProjectRequest,
    UserRepository,
};

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_project_crud_lifecycle() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let owner = db
        .users
        .create(CreateUserRequest {
            username: "crud_owner".to_string(),
            display_name: "CRUD Owner".to_string(),
            role: "Researcher".to_string(),
        })
        .await
        .expect("Failed to create user");

    // ========================================================================
    // CREATE
    // ========================================================================

    let created = db
        .projects
        .create(CreateProjectRequest {
            name: "Protein folding".to_string(),
            description: Some("Initial screen".to_string()),
            owner_id: owner.id,
        })
        .await
        .expect("Failed to create project");

    assert_eq!(created.name, "Protein folding");
    assert_eq!(created.owner_id, owner.id);
    assert_eq!(created.created_at_utc, created.updated_at_utc);

    // ========================================================================
    // READ
    // ========================================================================

    let fetched = db
        .projects
        .get(created.id)
        .await
        .expect("Failed to fetch project")
        .expect("Project not found");
    assert_eq!(fetched, created);

    // ========================================================================
    // UPDATE (partial merge)
    // ========================================================================

    let updated = db
        .projects
        .update(
            created.id,
            UpdateProjectRequest {
                name: Some("Protein folding v2".to_string()),
                description: None,
            },
        )
        .await
        .expect("Failed to update project")
        .expect("Project disappeared");

    assert_eq!(updated.name, "Protein folding v2");
    assert_eq!(updated.description.as_deref(), Some("Initial screen"));
    assert_eq!(updated.created_at_utc, created.created_at_utc);
    assert!(updated.updated_at_utc >= created.updated_at_utc);

    // ========================================================================
    // DELETE
    // ========================================================================

    assert!(db
        .projects
        .delete(created.id)
        .await
        .expect("Failed to delete project"));
    assert!(db
        .projects
        .get(created.id)
        .await
        .expect("Failed to query deleted project")
        .is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_partial_update_merge_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_partial_update_merge(&test_db.db.handle())
        .await
        .expect("partial update merge scenario failed");
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_no_timestamp_bubble_up_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_no_timestamp_bubble_up(&test_db.db.handle())
        .await
        .expect("timestamp bubble-up scenario failed");
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_referential_integrity_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_referential_integrity(&test_db.db.handle())
        .await
        .expect("referential integrity scenario failed");
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_attachment_payload_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_attachment_payload(&test_db.db.handle())
        .await
        .expect("attachment payload scenario failed");
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_full_conformance_suite() {
    let test_db = TestDatabase::new().await;
    conformance::check_all(&test_db.db.handle())
        .await
        .expect("full conformance suite failed");
    test_db.cleanup().await;
}

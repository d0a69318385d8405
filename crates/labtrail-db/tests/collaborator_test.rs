//! Integration tests for the collaborator relation and visibility union.
//!
//! **IMPORTANT**: These tests require a running PostgreSQL instance
//! reachable via `DATABASE_URL` (or the fixture default). Run with
//! `cargo test -- --ignored`.

use labtrail_core::conformance;
use labtrail_db::test_fixtures::TestDatabase;
use labtrail_db::{
    AddCollaboratorRequest, CollaboratorRepository, CreateProjectRequest, CreateUserRequest,
    ProjectRepository, UserRepository,
};

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_add_remove_collaborator_lifecycle() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let owner = db
        .users
        .create(CreateUserRequest {
            username: "lifecycle_owner".to_string(),
            display_name: "Owner".to_string(),
            role: "Researcher".to_string(),
        })
        .await
        .expect("Failed to create owner");
    let first = db
        .users
        .create(CreateUserRequest {
            username: "lifecycle_first".to_string(),
            display_name: "First".to_string(),
            role: "Researcher".to_string(),
        })
        .await
        .expect("Failed to create first user");
    let second = db
        .users
        .create(CreateUserRequest {
            username: "lifecycle_second".to_string(),
            display_name: "Second".to_string(),
            role: "Researcher".to_string(),
        })
        .await
        .expect("Failed to create second user");

    let project = db
        .projects
        .create(CreateProjectRequest {
            name: "Shared project".to_string(),
            description: None,
            owner_id: owner.id,
        })
        .await
        .expect("Failed to create project");

    db.collaborators
        .add(AddCollaboratorRequest {
            project_id: project.id,
            user_id: first.id,
            role: None,
        })
        .await
        .expect("Failed to add first collaborator");
    db.collaborators
        .add(AddCollaboratorRequest {
            project_id: project.id,
            user_id: second.id,
            role: Some("Editor".to_string()),
        })
        .await
        .expect("Failed to add second collaborator");

    // Remove one; exactly the other remains.
    assert!(db
        .collaborators
        .remove(project.id, first.id)
        .await
        .expect("Remove failed"));

    let remaining = db
        .collaborators
        .list_for_project(project.id)
        .await
        .expect("List failed");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_id, second.id);

    // Removing the same pair again reports false.
    assert!(!db
        .collaborators
        .remove(project.id, first.id)
        .await
        .expect("Second remove failed"));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_owner_collaborator_union_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_owner_collaborator_union(&test_db.db.handle())
        .await
        .expect("owner/collaborator union scenario failed");
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_collaborator_lifecycle_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_collaborator_lifecycle(&test_db.db.handle())
        .await
        .expect("collaborator lifecycle scenario failed");
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_user_deletion_guard_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_user_deletion_guard(&test_db.db.handle())
        .await
        .expect("user deletion guard scenario failed");
    test_db.cleanup().await;
}

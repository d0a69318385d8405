//! Integration tests for hierarchy cascade deletion.
//!
//! This test suite validates:
//! - Full project cascade (experiments, notes, attachments, collaborators)
//! - Experiment and note cascades
//! - Idempotent deletes of absent records
//!
//! **IMPORTANT**: These tests require a running PostgreSQL instance
//! reachable via `DATABASE_URL` (or the fixture default). Each test creates
//! and drops its own schema. Run with `cargo test -- --ignored`.

use labtrail_core::conformance;
use labtrail_db::test_fixtures::TestDatabase;
use labtrail_db::{
    AttachmentRepository, CreateAttachmentRequest, CreateExperimentRequest, CreateNoteRequest,
    CreateProjectRequest, CreateUserRequest, ExperimentRepository, NoteRepository,
    ProjectRepository, UserRepository,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_project_delete_removes_entire_subtree() {
    init_logging();
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    // ========================================================================
    // SEED: Lab A → Trial 1 → Obs 1 → scan.png
    // ========================================================================

    let owner = db
        .users
        .create(CreateUserRequest {
            username: "subtree_owner".to_string(),
            display_name: "Subtree Owner".to_string(),
            role: "Researcher".to_string(),
        })
        .await
        .expect("Failed to create user");

    let project = db
        .projects
        .create(CreateProjectRequest {
            name: "Lab A".to_string(),
            description: None,
            owner_id: owner.id,
        })
        .await
        .expect("Failed to create project");

    let experiment = db
        .experiments
        .create(CreateExperimentRequest {
            name: "Trial 1".to_string(),
            description: None,
            project_id: project.id,
        })
        .await
        .expect("Failed to create experiment");

    let note = db
        .notes
        .create(CreateNoteRequest {
            title: "Obs 1".to_string(),
            content: Some("First observation".to_string()),
            experiment_id: experiment.id,
            author_id: owner.id,
        })
        .await
        .expect("Failed to create note");

    let payload = vec![0x89, 0x50, 0x4E, 0x47];
    db.attachments
        .create(CreateAttachmentRequest {
            note_id: note.id,
            file_name: "scan.png".to_string(),
            file_type: "image/png".to_string(),
            file_size: payload.len() as i64,
            file_data: payload,
        })
        .await
        .expect("Failed to create attachment");

    // ========================================================================
    // DELETE the project
    // ========================================================================

    let removed = db
        .projects
        .delete(project.id)
        .await
        .expect("Cascade delete failed");
    assert!(removed, "Existing project must report true on delete");

    // ========================================================================
    // VERIFY: nothing under the project survives
    // ========================================================================

    assert!(db
        .experiments
        .list_by_project(project.id)
        .await
        .expect("Failed to list experiments")
        .is_empty());
    assert!(db
        .notes
        .list_by_experiment(experiment.id)
        .await
        .expect("Failed to list notes")
        .is_empty());
    assert!(db
        .attachments
        .list_by_note(note.id)
        .await
        .expect("Failed to list attachments")
        .is_empty());
    assert!(db
        .projects
        .get(project.id)
        .await
        .expect("Failed to query project")
        .is_none());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_project_cascade_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_project_cascade(&test_db.db.handle())
        .await
        .expect("project cascade scenario failed");
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_experiment_cascade_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_experiment_cascade(&test_db.db.handle())
        .await
        .expect("experiment cascade scenario failed");
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_note_cascade_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_note_cascade(&test_db.db.handle())
        .await
        .expect("note cascade scenario failed");
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_idempotent_absence_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_idempotent_absence(&test_db.db.handle())
        .await
        .expect("idempotent absence scenario failed");
    test_db.cleanup().await;
}

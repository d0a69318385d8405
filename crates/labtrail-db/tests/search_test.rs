//! Integration tests for substring search.
//!
//! **IMPORTANT**: These tests require a running PostgreSQL instance
//! reachable via `DATABASE_URL` (or the fixture default). Run with
//! `cargo test -- --ignored`.

use labtrail_core::conformance;
use labtrail_db::test_fixtures::TestDatabase;
use labtrail_db::{
    CreateExperimentRequest, CreateNoteRequest, CreateProjectRequest, CreateUserRequest,
    ExperimentRepository, NoteRepository, ProjectRepository, RecordSearch, UserRepository,
};

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_search_rules_conformance() {
    let test_db = TestDatabase::new().await;
    conformance::check_search_rules(&test_db.db.handle())
        .await
        .expect("search rules scenario failed");
    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_like_wildcards_match_literally() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let owner = db
        .users
        .create(CreateUserRequest {
            username: "wildcard_owner".to_string(),
            display_name: "Wildcard".to_string(),
            role: "Researcher".to_string(),
        })
        .await
        .expect("Failed to create user");

    let project = db
        .projects
        .create(CreateProjectRequest {
            name: "Yield 100% confirmed".to_string(),
            description: None,
            owner_id: owner.id,
        })
        .await
        .expect("Failed to create project");
    let control = db
        .projects
        .create(CreateProjectRequest {
            name: "Yield 100 of anything".to_string(),
            description: None,
            owner_id: owner.id,
        })
        .await
        .expect("Failed to create project");

    // `%` in the query is a literal character, not a wildcard.
    let hits = db.search.search_projects("100%").await.expect("Search failed");
    assert!(hits.iter().any(|p| p.id == project.id));
    assert!(!hits.iter().any(|p| p.id == control.id));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL test database"]
async fn test_combined_search_spans_categories() {
    let test_db = TestDatabase::new().await;
    let db = &test_db.db;

    let owner = db
        .users
        .create(CreateUserRequest {
            username: "combined_owner".to_string(),
            display_name: "Combined".to_string(),
            role: "Researcher".to_string(),
        })
        .await
        .expect("Failed to create user");

    let project = db
        .projects
        .create(CreateProjectRequest {
            name: "Calibration study".to_string(),
            description: None,
            owner_id: owner.id,
        })
        .await
        .expect("Failed to create project");
    let experiment = db
        .experiments
        .create(CreateExperimentRequest {
            name: "Sensor calibration run".to_string(),
            description: None,
            project_id: project.id,
        })
        .await
        .expect("Failed to create experiment");
    db.notes
        .create(CreateNoteRequest {
            title: "Calibration drift".to_string(),
            content: None,
            experiment_id: experiment.id,
            author_id: owner.id,
        })
        .await
        .expect("Failed to create note");

    let results = db
        .search
        .search_all("calibration")
        .await
        .expect("Combined search failed");
    assert_eq!(results.projects.len(), 1);
    assert_eq!(results.experiments.len(), 1);
    assert_eq!(results.notes.len(), 1);

    test_db.cleanup().await;
}

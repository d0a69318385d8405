//! Backend-specific behavior of the in-memory store: default-user
//! bootstrap and monotonic id assignment.

use labtrail_core::{
    CreateProjectRequest, CreateUserRequest, ProjectRepository, UserRepository,
};
use labtrail_mem::{MemDatabase, DEFAULT_USERNAME};

#[tokio::test]
async fn test_default_user_seeded() {
    let db = MemDatabase::new();

    let seeded = db
        .users
        .get_by_username(DEFAULT_USERNAME)
        .await
        .expect("lookup failed")
        .expect("default user must be seeded");

    assert_eq!(seeded.id, 1, "bootstrap user takes the first id");
    assert_eq!(seeded.role, "Admin");

    let all = db.users.list().await.expect("list failed");
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_ids_are_monotonic_per_entity_type() {
    let db = MemDatabase::new();

    let owner = db
        .users
        .create(CreateUserRequest {
            username: "mono".to_string(),
            display_name: "Mono".to_string(),
            role: "Researcher".to_string(),
        })
        .await
        .expect("user create failed");
    // The bootstrap user holds id 1.
    assert_eq!(owner.id, 2);

    let first = db
        .projects
        .create(CreateProjectRequest {
            name: "First".to_string(),
            description: None,
            owner_id: owner.id,
        })
        .await
        .expect("project create failed");
    let second = db
        .projects
        .create(CreateProjectRequest {
            name: "Second".to_string(),
            description: None,
            owner_id: owner.id,
        })
        .await
        .expect("project create failed");

    assert_eq!(first.id, 1, "project counter is independent of users");
    assert_eq!(second.id, 2);

    // Ids are never reused, even after deletion.
    assert!(db.projects.delete(second.id).await.expect("delete failed"));
    let third = db
        .projects
        .create(CreateProjectRequest {
            name: "Third".to_string(),
            description: None,
            owner_id: owner.id,
        })
        .await
        .expect("project create failed");
    assert_eq!(third.id, 3);
}

#[tokio::test]
async fn test_listing_follows_creation_order() {
    let db = MemDatabase::new();

    let owner = db
        .users
        .create(CreateUserRequest {
            username: "order".to_string(),
            display_name: "Order".to_string(),
            role: "Researcher".to_string(),
        })
        .await
        .expect("user create failed");

    for name in ["alpha", "beta", "gamma"] {
        db.projects
            .create(CreateProjectRequest {
                name: name.to_string(),
                description: None,
                owner_id: owner.id,
            })
            .await
            .expect("project create failed");
    }

    let listed = db.projects.list().await.expect("list failed");
    let names: Vec<&str> = listed.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta", "gamma"]);
}

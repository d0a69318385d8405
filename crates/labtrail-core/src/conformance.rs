//! Backend conformance scenarios.
//!
//! The repository contract has two implementations (PostgreSQL and
//! in-memory) that must behave identically to callers. Rather than
//! duplicating test logic per backend, each scenario here takes a
//! [`BackendHandle`] of trait objects and asserts one contract property;
//! the backends' integration tests run the same scenarios against their
//! own stores.
//!
//! Note: Always compiled so integration tests (in each backend's `tests/`)
//! can use the scenarios.

use crate::error::{Error, Result};
use crate::models::*;
use crate::traits::*;
use crate::validate::compute_content_hash;

/// Borrowed view of one backend's full repository set.
pub struct BackendHandle<'a> {
    pub users: &'a dyn UserRepository,
    pub projects: &'a dyn ProjectRepository,
    pub experiments: &'a dyn ExperimentRepository,
    pub notes: &'a dyn NoteRepository,
    pub attachments: &'a dyn AttachmentRepository,
    pub collaborators: &'a dyn CollaboratorRepository,
    pub search: &'a dyn RecordSearch,
}

/// An id that no scenario ever creates.
const ABSENT_ID: i64 = 999_999;

async fn seed_user(b: &BackendHandle<'_>, username: &str) -> Result<User> {
    b.users
        .create(CreateUserRequest {
            username: username.to_string(),
            display_name: format!("{username} (conformance)"),
            role: "Researcher".to_string(),
        })
        .await
}

/// Seed a full Project → Experiment → Note → Attachment chain.
async fn seed_tree(
    b: &BackendHandle<'_>,
    owner_id: i64,
    prefix: &str,
) -> Result<(Project, Experiment, Note, Attachment)> {
    let project = b
        .projects
        .create(CreateProjectRequest {
            name: format!("{prefix} project"),
            description: Some(format!("{prefix} description")),
            owner_id,
        })
        .await?;

    let experiment = b
        .experiments
        .create(CreateExperimentRequest {
            name: format!("{prefix} experiment"),
            description: None,
            project_id: project.id,
        })
        .await?;

    let note = b
        .notes
        .create(CreateNoteRequest {
            title: format!("{prefix} note"),
            content: Some(format!("{prefix} content")),
            experiment_id: experiment.id,
            author_id: owner_id,
        })
        .await?;

    let payload = b"\x89PNG fake scan bytes".to_vec();
    let attachment = b
        .attachments
        .create(CreateAttachmentRequest {
            note_id: note.id,
            file_name: "scan.png".to_string(),
            file_type: "image/png".to_string(),
            file_size: payload.len() as i64,
            file_data: payload,
        })
        .await?;

    Ok((project, experiment, note, attachment))
}

/// Deleting a project removes every experiment, note, attachment, and
/// collaborator row under it, atomically from the caller's point of view.
pub async fn check_project_cascade(b: &BackendHandle<'_>) -> Result<()> {
    let owner = seed_user(b, "cascade_owner").await?;
    let guest = seed_user(b, "cascade_guest").await?;
    let (project, experiment, note, attachment) = seed_tree(b, owner.id, "cascade").await?;

    b.collaborators
        .add(AddCollaboratorRequest {
            project_id: project.id,
            user_id: guest.id,
            role: None,
        })
        .await?;

    let removed = b.projects.delete(project.id).await?;
    assert!(removed, "deleting an existing project must report true");

    assert!(b.projects.get(project.id).await?.is_none());
    assert!(b.experiments.get(experiment.id).await?.is_none());
    assert!(b.notes.get(note.id).await?.is_none());
    assert!(b.attachments.get(attachment.id).await?.is_none());
    assert!(b
        .experiments
        .list_by_project(project.id)
        .await?
        .is_empty());
    assert!(b.notes.list_by_experiment(experiment.id).await?.is_empty());
    assert!(b.attachments.list_by_note(note.id).await?.is_empty());
    assert!(b
        .collaborators
        .list_for_project(project.id)
        .await?
        .is_empty());

    // A second delete is an idempotent no-op.
    assert!(!b.projects.delete(project.id).await?);
    Ok(())
}

/// Deleting an experiment removes its notes and their attachments but
/// leaves the parent project and sibling experiments alone.
pub async fn check_experiment_cascade(b: &BackendHandle<'_>) -> Result<()> {
    let owner = seed_user(b, "exp_cascade_owner").await?;
    let (project, experiment, note, attachment) = seed_tree(b, owner.id, "exp_cascade").await?;

    let sibling = b
        .experiments
        .create(CreateExperimentRequest {
            name: "exp_cascade sibling".to_string(),
            description: None,
            project_id: project.id,
        })
        .await?;

    assert!(b.experiments.delete(experiment.id).await?);

    assert!(b.experiments.get(experiment.id).await?.is_none());
    assert!(b.notes.get(note.id).await?.is_none());
    assert!(b.attachments.get(attachment.id).await?.is_none());
    assert!(b.projects.get(project.id).await?.is_some());
    assert!(b.experiments.get(sibling.id).await?.is_some());
    Ok(())
}

/// Deleting a note removes its attachments only.
pub async fn check_note_cascade(b: &BackendHandle<'_>) -> Result<()> {
    let owner = seed_user(b, "note_cascade_owner").await?;
    let (_project, experiment, note, attachment) = seed_tree(b, owner.id, "note_cascade").await?;

    assert!(b.notes.delete(note.id).await?);

    assert!(b.notes.get(note.id).await?.is_none());
    assert!(b.attachments.get(attachment.id).await?.is_none());
    assert!(b.experiments.get(experiment.id).await?.is_some());
    assert!(b.notes.list_by_experiment(experiment.id).await?.is_empty());
    Ok(())
}

/// Absent targets: `get`/`update` report `None`, `delete` reports `false`,
/// and nothing is mutated.
pub async fn check_idempotent_absence(b: &BackendHandle<'_>) -> Result<()> {
    assert!(b.users.get(ABSENT_ID).await?.is_none());
    assert!(b.projects.get(ABSENT_ID).await?.is_none());
    assert!(b.experiments.get(ABSENT_ID).await?.is_none());
    assert!(b.notes.get(ABSENT_ID).await?.is_none());
    assert!(b.attachments.get(ABSENT_ID).await?.is_none());

    assert!(!b.projects.delete(ABSENT_ID).await?);
    assert!(!b.experiments.delete(ABSENT_ID).await?);
    assert!(!b.notes.delete(ABSENT_ID).await?);
    assert!(!b.attachments.delete(ABSENT_ID).await?);
    assert!(!b.users.delete(ABSENT_ID).await?);
    assert!(!b.collaborators.remove(ABSENT_ID, ABSENT_ID).await?);

    let patch = UpdateProjectRequest {
        name: Some("never applied".to_string()),
        description: None,
    };
    assert!(b.projects.update(ABSENT_ID, patch).await?.is_none());
    Ok(())
}

/// Partial update changes only the supplied fields plus `updated_at_utc`.
pub async fn check_partial_update_merge(b: &BackendHandle<'_>) -> Result<()> {
    let owner = seed_user(b, "merge_owner").await?;
    let project = b
        .projects
        .create(CreateProjectRequest {
            name: "Merge before".to_string(),
            description: Some("kept description".to_string()),
            owner_id: owner.id,
        })
        .await?;

    let updated = b
        .projects
        .update(
            project.id,
            UpdateProjectRequest {
                name: Some("Merge after".to_string()),
                description: None,
            },
        )
        .await?
        .expect("project exists");

    assert_eq!(updated.name, "Merge after");
    assert_eq!(updated.description.as_deref(), Some("kept description"));
    assert_eq!(updated.id, project.id);
    assert_eq!(updated.owner_id, project.owner_id);
    assert_eq!(updated.created_at_utc, project.created_at_utc);
    assert!(updated.updated_at_utc >= project.updated_at_utc);

    // An explicit null clears the nullable field.
    let cleared = b
        .projects
        .update(
            project.id,
            UpdateProjectRequest {
                name: None,
                description: Some(None),
            },
        )
        .await?
        .expect("project exists");
    assert_eq!(cleared.name, "Merge after");
    assert!(cleared.description.is_none());
    Ok(())
}

/// Child mutations never refresh the parent's `updated_at_utc`.
pub async fn check_no_timestamp_bubble_up(b: &BackendHandle<'_>) -> Result<()> {
    let owner = seed_user(b, "bubble_owner").await?;
    let (project, experiment, note, _attachment) = seed_tree(b, owner.id, "bubble").await?;

    let project_before = b.projects.get(project.id).await?.expect("project exists");
    let experiment_before = b
        .experiments
        .get(experiment.id)
        .await?
        .expect("experiment exists");

    b.notes
        .update(
            note.id,
            UpdateNoteRequest {
                title: Some("bubble note renamed".to_string()),
                content: None,
                experiment_id: None,
            },
        )
        .await?
        .expect("note exists");

    let project_after = b.projects.get(project.id).await?.expect("project exists");
    let experiment_after = b
        .experiments
        .get(experiment.id)
        .await?
        .expect("experiment exists");

    assert_eq!(project_before.updated_at_utc, project_after.updated_at_utc);
    assert_eq!(
        experiment_before.updated_at_utc,
        experiment_after.updated_at_utc
    );
    Ok(())
}

/// `list_for_user` is owned ∪ collaborated, deduplicated by project id.
pub async fn check_owner_collaborator_union(b: &BackendHandle<'_>) -> Result<()> {
    let alice = seed_user(b, "union_alice").await?;
    let bob = seed_user(b, "union_bob").await?;

    let owned_a = b
        .projects
        .create(CreateProjectRequest {
            name: "union owned A".to_string(),
            description: None,
            owner_id: alice.id,
        })
        .await?;
    let owned_b = b
        .projects
        .create(CreateProjectRequest {
            name: "union owned B".to_string(),
            description: None,
            owner_id: alice.id,
        })
        .await?;
    let shared = b
        .projects
        .create(CreateProjectRequest {
            name: "union shared".to_string(),
            description: None,
            owner_id: bob.id,
        })
        .await?;

    b.collaborators
        .add(AddCollaboratorRequest {
            project_id: shared.id,
            user_id: alice.id,
            role: Some("Editor".to_string()),
        })
        .await?;
    // Owner listed as collaborator on their own project must not duplicate
    // the union entry.
    b.collaborators
        .add(AddCollaboratorRequest {
            project_id: owned_a.id,
            user_id: alice.id,
            role: None,
        })
        .await?;

    let visible = b.projects.list_for_user(alice.id).await?;
    let mut ids: Vec<i64> = visible.iter().map(|p| p.id).collect();
    let expected = {
        let mut v = vec![owned_a.id, owned_b.id, shared.id];
        v.sort_unstable();
        v
    };
    ids.sort_unstable();
    assert_eq!(ids, expected, "union must contain each project exactly once");

    let for_bob = b.projects.list_for_user(bob.id).await?;
    assert_eq!(for_bob.len(), 1);
    assert_eq!(for_bob[0].id, shared.id);
    Ok(())
}

/// Add/remove collaborator lifecycle, including the idempotent re-remove.
pub async fn check_collaborator_lifecycle(b: &BackendHandle<'_>) -> Result<()> {
    let owner = seed_user(b, "collab_owner").await?;
    let first = seed_user(b, "collab_first").await?;
    let second = seed_user(b, "collab_second").await?;

    let project = b
        .projects
        .create(CreateProjectRequest {
            name: "collab project".to_string(),
            description: None,
            owner_id: owner.id,
        })
        .await?;

    let added = b
        .collaborators
        .add(AddCollaboratorRequest {
            project_id: project.id,
            user_id: first.id,
            role: None,
        })
        .await?;
    assert_eq!(added.role, DEFAULT_COLLABORATOR_ROLE);

    b.collaborators
        .add(AddCollaboratorRequest {
            project_id: project.id,
            user_id: second.id,
            role: Some("Editor".to_string()),
        })
        .await?;

    // Duplicate pair is rejected before mutation.
    let duplicate = b
        .collaborators
        .add(AddCollaboratorRequest {
            project_id: project.id,
            user_id: first.id,
            role: None,
        })
        .await;
    assert!(matches!(duplicate, Err(Error::Validation(_))));

    assert!(b.collaborators.remove(project.id, first.id).await?);

    let remaining = b.collaborators.list_for_project(project.id).await?;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].user_id, second.id);
    assert_eq!(remaining[0].role, "Editor");

    assert!(!b.collaborators.remove(project.id, first.id).await?);
    Ok(())
}

/// Substring search: case-insensitive, two fields per category, blank query
/// matches nothing, absent optional fields match as empty strings.
pub async fn check_search_rules(b: &BackendHandle<'_>) -> Result<()> {
    let owner = seed_user(b, "search_owner").await?;

    let kinetics = b
        .projects
        .create(CreateProjectRequest {
            name: "Enzyme Kinetics".to_string(),
            description: None,
            owner_id: owner.id,
        })
        .await?;
    let described = b
        .projects
        .create(CreateProjectRequest {
            name: "Plain name".to_string(),
            description: Some("substrate titration series".to_string()),
            owner_id: owner.id,
        })
        .await?;

    let experiment = b
        .experiments
        .create(CreateExperimentRequest {
            name: "Buffer Screen".to_string(),
            description: Some("phosphate gradient".to_string()),
            project_id: kinetics.id,
        })
        .await?;

    let note = b
        .notes
        .create(CreateNoteRequest {
            title: "Protein Assay".to_string(),
            content: Some("Bradford readings at 595nm".to_string()),
            experiment_id: experiment.id,
            author_id: owner.id,
        })
        .await?;

    // Case-insensitive title match, both casings.
    let hits = b.search.search_notes("assay").await?;
    assert!(hits.iter().any(|n| n.id == note.id));
    let hits = b.search.search_notes("ASSAY").await?;
    assert!(hits.iter().any(|n| n.id == note.id));

    // Substring in the second field (content/description).
    let hits = b.search.search_notes("595").await?;
    assert!(hits.iter().any(|n| n.id == note.id));
    let hits = b.search.search_projects("titration").await?;
    assert!(hits.iter().any(|p| p.id == described.id));
    let hits = b.search.search_experiments("phosphate").await?;
    assert!(hits.iter().any(|e| e.id == experiment.id));

    // A description-less project matches by name and never crashes.
    let hits = b.search.search_projects("kinet").await?;
    assert!(hits.iter().any(|p| p.id == kinetics.id));

    // Blank queries match nothing, in every category.
    assert!(b.search.search_notes("").await?.is_empty());
    assert!(b.search.search_projects("   ").await?.is_empty());
    assert!(b.search.search_experiments("\t").await?.is_empty());
    assert!(b.search.search_all("  ").await?.is_empty());

    // Combined search carries each category independently.
    let combined = b.search.search_all("assay").await?;
    assert!(combined.notes.iter().any(|n| n.id == note.id));
    assert!(combined.projects.is_empty());
    Ok(())
}

/// Creating against a missing parent is rejected with
/// `Error::ReferentialIntegrity` before any mutation.
pub async fn check_referential_integrity(b: &BackendHandle<'_>) -> Result<()> {
    let owner = seed_user(b, "ri_owner").await?;
    let (project, experiment, note, _attachment) = seed_tree(b, owner.id, "ri").await?;

    let orphan_project = b
        .projects
        .create(CreateProjectRequest {
            name: "orphan".to_string(),
            description: None,
            owner_id: ABSENT_ID,
        })
        .await;
    assert!(matches!(
        orphan_project,
        Err(Error::ReferentialIntegrity(_))
    ));

    let orphan_experiment = b
        .experiments
        .create(CreateExperimentRequest {
            name: "orphan".to_string(),
            description: None,
            project_id: ABSENT_ID,
        })
        .await;
    assert!(matches!(
        orphan_experiment,
        Err(Error::ReferentialIntegrity(_))
    ));

    let orphan_note = b
        .notes
        .create(CreateNoteRequest {
            title: "orphan".to_string(),
            content: None,
            experiment_id: ABSENT_ID,
            author_id: owner.id,
        })
        .await;
    assert!(matches!(orphan_note, Err(Error::ReferentialIntegrity(_))));

    let ghost_author = b
        .notes
        .create(CreateNoteRequest {
            title: "ghost author".to_string(),
            content: None,
            experiment_id: experiment.id,
            author_id: ABSENT_ID,
        })
        .await;
    assert!(matches!(ghost_author, Err(Error::ReferentialIntegrity(_))));

    let orphan_attachment = b
        .attachments
        .create(CreateAttachmentRequest {
            note_id: ABSENT_ID,
            file_name: "scan.png".to_string(),
            file_type: "image/png".to_string(),
            file_size: 1,
            file_data: vec![0],
        })
        .await;
    assert!(matches!(
        orphan_attachment,
        Err(Error::ReferentialIntegrity(_))
    ));

    let orphan_collaborator = b
        .collaborators
        .add(AddCollaboratorRequest {
            project_id: ABSENT_ID,
            user_id: owner.id,
            role: None,
        })
        .await;
    assert!(matches!(
        orphan_collaborator,
        Err(Error::ReferentialIntegrity(_))
    ));

    // Re-parenting to a missing parent is refused and leaves the record
    // untouched.
    let moved = b
        .notes
        .update(
            note.id,
            UpdateNoteRequest {
                title: None,
                content: None,
                experiment_id: Some(ABSENT_ID),
            },
        )
        .await;
    assert!(matches!(moved, Err(Error::ReferentialIntegrity(_))));
    let unchanged = b.notes.get(note.id).await?.expect("note still present");
    assert_eq!(unchanged.experiment_id, experiment.id);

    // The valid tree is still intact.
    assert!(b.projects.get(project.id).await?.is_some());
    Ok(())
}

/// Attachment payloads round-trip byte-for-byte with a stable content hash,
/// and listings carry metadata without payloads.
pub async fn check_attachment_payload(b: &BackendHandle<'_>) -> Result<()> {
    let owner = seed_user(b, "payload_owner").await?;
    let (_project, _experiment, note, _attachment) = seed_tree(b, owner.id, "payload").await?;

    let payload: Vec<u8> = (0u16..512).map(|i| (i % 251) as u8).collect();
    let created = b
        .attachments
        .create(CreateAttachmentRequest {
            note_id: note.id,
            file_name: "../escape/gel image.tiff".to_string(),
            file_type: "image/tiff".to_string(),
            file_size: payload.len() as i64,
            file_data: payload.clone(),
        })
        .await?;

    assert_eq!(created.file_name, "gel image.tiff", "path components stripped");
    assert_eq!(created.content_hash, compute_content_hash(&payload));

    let fetched = b
        .attachments
        .get(created.id)
        .await?
        .expect("attachment exists");
    assert_eq!(fetched.file_data, payload);
    assert_eq!(fetched.file_size, payload.len() as i64);

    let summaries = b.attachments.list_by_note(note.id).await?;
    let summary = summaries
        .iter()
        .find(|s| s.id == created.id)
        .expect("summary listed");
    assert_eq!(summary.file_name, created.file_name);
    assert_eq!(summary.content_hash, created.content_hash);
    assert_eq!(summary.file_size, created.file_size);
    Ok(())
}

/// User deletion is refused while the user owns projects; once the projects
/// are gone the user and their collaborator rows disappear.
pub async fn check_user_deletion_guard(b: &BackendHandle<'_>) -> Result<()> {
    let owner = seed_user(b, "guard_owner").await?;
    let other = seed_user(b, "guard_other").await?;
    let (project, _experiment, _note, _attachment) = seed_tree(b, owner.id, "guard").await?;

    let theirs = b
        .projects
        .create(CreateProjectRequest {
            name: "guard other project".to_string(),
            description: None,
            owner_id: other.id,
        })
        .await?;
    b.collaborators
        .add(AddCollaboratorRequest {
            project_id: theirs.id,
            user_id: owner.id,
            role: None,
        })
        .await?;

    let refused = b.users.delete(owner.id).await;
    assert!(matches!(refused, Err(Error::ReferentialIntegrity(_))));
    assert!(b.users.get(owner.id).await?.is_some());

    assert!(b.projects.delete(project.id).await?);
    assert!(b.users.delete(owner.id).await?);
    assert!(b.users.get(owner.id).await?.is_none());
    assert!(b
        .collaborators
        .list_for_project(theirs.id)
        .await?
        .is_empty());
    Ok(())
}

/// Run every scenario in sequence against one backend.
///
/// Scenarios use disjoint usernames, so a single fresh store can host the
/// whole suite.
pub async fn check_all(b: &BackendHandle<'_>) -> Result<()> {
    check_project_cascade(b).await?;
    check_experiment_cascade(b).await?;
    check_note_cascade(b).await?;
    check_idempotent_absence(b).await?;
    check_partial_update_merge(b).await?;
    check_no_timestamp_bubble_up(b).await?;
    check_owner_collaborator_union(b).await?;
    check_collaborator_lifecycle(b).await?;
    check_search_rules(b).await?;
    check_referential_integrity(b).await?;
    check_attachment_payload(b).await?;
    check_user_deletion_guard(b).await?;
    Ok(())
}

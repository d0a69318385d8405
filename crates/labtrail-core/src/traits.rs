//! Repository traits for the labtrail storage core.
//!
//! These traits define the capability contract every backend must satisfy,
//! enabling pluggable backends and testability. Two implementations exist:
//! the PostgreSQL backend in `labtrail-db` and the in-memory reference
//! backend in `labtrail-mem`; both are exercised by the same conformance
//! scenarios (see [`crate::conformance`]).
//!
//! ## Contracts
//!
//! - `get`/`update` report absence with `None`; `delete`/`remove` return
//!   `false` when the target does not exist. Neither is an error.
//! - `create` assigns the id and timestamps; a declared parent id that does
//!   not resolve is rejected with [`Error::ReferentialIntegrity`] before any
//!   mutation.
//! - `update` merges only supplied fields and refreshes `updated_at_utc` in
//!   the same mutation; `id` and `created_at_utc` are immutable.
//! - Deletes cascade leaf-to-root and are atomic from the caller's point of
//!   view: no orphaned child survives a parent deletion, and no caller
//!   observes a partially deleted subtree.
//!
//! [`Error::ReferentialIntegrity`]: crate::error::Error::ReferentialIntegrity

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;
use crate::search::SearchResults;

// =============================================================================
// USER REPOSITORY
// =============================================================================

/// Repository for user records.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user. Usernames are unique.
    async fn create(&self, req: CreateUserRequest) -> Result<User>;

    /// Fetch a user by id.
    async fn get(&self, id: i64) -> Result<Option<User>>;

    /// Fetch a user by unique username.
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// List all users in creation order.
    async fn list(&self) -> Result<Vec<User>>;

    /// Partially update a user.
    async fn update(&self, id: i64, req: UpdateUserRequest) -> Result<Option<User>>;

    /// Delete a user and their collaborator rows. Refused while the user
    /// still owns projects. Returns `true` iff a record was removed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

// =============================================================================
// PROJECT REPOSITORY
// =============================================================================

/// Repository for projects, including cascade deletion over the whole
/// experiment/note/attachment subtree.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Create a new project. The owner must exist.
    async fn create(&self, req: CreateProjectRequest) -> Result<Project>;

    /// Fetch a project by id.
    async fn get(&self, id: i64) -> Result<Option<Project>>;

    /// List all projects in creation order.
    async fn list(&self) -> Result<Vec<Project>>;

    /// List projects visible to a user: owned ∪ collaborated, deduplicated
    /// by project id, owned first.
    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Project>>;

    /// Partially update a project, refreshing `updated_at_utc`.
    async fn update(&self, id: i64, req: UpdateProjectRequest) -> Result<Option<Project>>;

    /// Delete a project and, transitively, its experiments, their notes,
    /// those notes' attachments, and all collaborator rows. Returns `true`
    /// iff the project existed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

// =============================================================================
// EXPERIMENT REPOSITORY
// =============================================================================

/// Repository for experiments.
#[async_trait]
pub trait ExperimentRepository: Send + Sync {
    /// Create a new experiment. The parent project must exist.
    async fn create(&self, req: CreateExperimentRequest) -> Result<Experiment>;

    /// Fetch an experiment by id.
    async fn get(&self, id: i64) -> Result<Option<Experiment>>;

    /// List all experiments in creation order.
    async fn list(&self) -> Result<Vec<Experiment>>;

    /// List experiments belonging to a project.
    async fn list_by_project(&self, project_id: i64) -> Result<Vec<Experiment>>;

    /// Partially update an experiment, refreshing `updated_at_utc`.
    async fn update(&self, id: i64, req: UpdateExperimentRequest) -> Result<Option<Experiment>>;

    /// Delete an experiment, its notes, and their attachments. Returns
    /// `true` iff the experiment existed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

// =============================================================================
// NOTE REPOSITORY
// =============================================================================

/// Repository for notes.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Create a new note. The parent experiment and the author must exist.
    async fn create(&self, req: CreateNoteRequest) -> Result<Note>;

    /// Fetch a note by id.
    async fn get(&self, id: i64) -> Result<Option<Note>>;

    /// List all notes in creation order.
    async fn list(&self) -> Result<Vec<Note>>;

    /// List notes belonging to an experiment.
    async fn list_by_experiment(&self, experiment_id: i64) -> Result<Vec<Note>>;

    /// Partially update a note, refreshing `updated_at_utc`.
    async fn update(&self, id: i64, req: UpdateNoteRequest) -> Result<Option<Note>>;

    /// Delete a note and its attachments. Returns `true` iff the note
    /// existed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

// =============================================================================
// ATTACHMENT REPOSITORY
// =============================================================================

/// Repository for binary attachments.
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// Store a new attachment. The parent note must exist.
    async fn create(&self, req: CreateAttachmentRequest) -> Result<Attachment>;

    /// Fetch an attachment by id, payload included.
    async fn get(&self, id: i64) -> Result<Option<Attachment>>;

    /// List attachments on a note, without payloads.
    async fn list_by_note(&self, note_id: i64) -> Result<Vec<AttachmentSummary>>;

    /// Delete an attachment. Returns `true` iff it existed.
    async fn delete(&self, id: i64) -> Result<bool>;
}

// =============================================================================
// COLLABORATOR REPOSITORY
// =============================================================================

/// Repository for the project↔user collaborator relation.
#[async_trait]
pub trait CollaboratorRepository: Send + Sync {
    /// Add a collaborator to a project. Project and user must exist; a
    /// duplicate pair is rejected.
    async fn add(&self, req: AddCollaboratorRequest) -> Result<ProjectCollaborator>;

    /// Remove a collaborator. Returns `true` iff the pair existed.
    async fn remove(&self, project_id: i64, user_id: i64) -> Result<bool>;

    /// List collaborators of a project.
    async fn list_for_project(&self, project_id: i64) -> Result<Vec<ProjectCollaborator>>;
}

// =============================================================================
// SEARCH
// =============================================================================

/// Case-insensitive substring search across record categories.
///
/// Each operation matches two text fields of its category (name/description
/// for projects and experiments, title/content for notes); a missing
/// optional field matches as the empty string. A blank query returns an
/// empty result set.
#[async_trait]
pub trait RecordSearch: Send + Sync {
    async fn search_projects(&self, query: &str) -> Result<Vec<Project>>;

    async fn search_experiments(&self, query: &str) -> Result<Vec<Experiment>>;

    async fn search_notes(&self, query: &str) -> Result<Vec<Note>>;

    /// Run the three category searches independently and bundle the results.
    async fn search_all(&self, query: &str) -> Result<SearchResults>;
}

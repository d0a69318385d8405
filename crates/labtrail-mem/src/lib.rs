//! # labtrail-mem
//!
//! In-memory backend for the labtrail storage core.
//!
//! Satisfies the same repository contract as the PostgreSQL backend using
//! keyed collections and per-entity monotonic counters, with no external
//! dependencies. Useful as a conformance reference and for tests: every
//! invariant of the relational backend is independently verifiable here.
//!
//! Atomicity comes from structure rather than transactions: each operation
//! takes the store's single write lock, completes without suspending, and
//! releases it, so multi-step cascades are never observable half-done.
//!
//! ## Example
//!
//! ```rust,ignore
//! use labtrail_mem::MemDatabase;
//! use labtrail_core::{CreateProjectRequest, ProjectRepository};
//!
//! let db = MemDatabase::new(); // seeds the default user (id 1)
//! let project = db.projects.create(CreateProjectRequest {
//!     name: "Lab A".to_string(),
//!     description: None,
//!     owner_id: 1,
//! }).await?;
//! ```

use std::sync::{Arc, RwLock};

use chrono::Utc;
use tracing::info;

use labtrail_core::conformance::BackendHandle;
use labtrail_core::User;

pub mod attachments;
pub mod collaborators;
pub mod experiments;
pub mod notes;
pub mod projects;
pub mod search;
mod state;
pub mod users;

pub use attachments::MemAttachmentRepository;
pub use collaborators::MemCollaboratorRepository;
pub use experiments::MemExperimentRepository;
pub use notes::MemNoteRepository;
pub use projects::MemProjectRepository;
pub use search::MemRecordSearch;
pub use users::MemUserRepository;

use state::MemState;

/// Username of the user seeded on construction.
///
/// Backend-specific bootstrap, not part of the repository contract: a fresh
/// in-memory store is usable without a separate user-creation step.
pub const DEFAULT_USERNAME: &str = "admin";

/// Combined in-memory context with all repositories.
#[derive(Clone)]
pub struct MemDatabase {
    /// User repository.
    pub users: MemUserRepository,
    /// Project repository, including the full cascade delete.
    pub projects: MemProjectRepository,
    /// Experiment repository.
    pub experiments: MemExperimentRepository,
    /// Note repository.
    pub notes: MemNoteRepository,
    /// Attachment repository.
    pub attachments: MemAttachmentRepository,
    /// Project collaborator repository.
    pub collaborators: MemCollaboratorRepository,
    /// Substring search provider.
    pub search: MemRecordSearch,
}

impl MemDatabase {
    /// Create a fresh in-memory store and seed the default user.
    pub fn new() -> Self {
        let shared = Arc::new(RwLock::new(MemState::new()));

        {
            let mut state = state::write(&shared);
            let id = state.next_user_id();
            state.users.insert(
                id,
                User {
                    id,
                    username: DEFAULT_USERNAME.to_string(),
                    display_name: "Administrator".to_string(),
                    role: "Admin".to_string(),
                    created_at_utc: Utc::now(),
                },
            );
        }

        info!(
            subsystem = "mem",
            op = "bootstrap",
            "In-memory store seeded with default user"
        );

        Self {
            users: MemUserRepository::new(shared.clone()),
            projects: MemProjectRepository::new(shared.clone()),
            experiments: MemExperimentRepository::new(shared.clone()),
            notes: MemNoteRepository::new(shared.clone()),
            attachments: MemAttachmentRepository::new(shared.clone()),
            collaborators: MemCollaboratorRepository::new(shared.clone()),
            search: MemRecordSearch::new(shared),
        }
    }

    /// Borrow every repository as its trait object, for code written
    /// against the abstract capability set.
    pub fn handle(&self) -> BackendHandle<'_> {
        BackendHandle {
            users: &self.users,
            projects: &self.projects,
            experiments: &self.experiments,
            notes: &self.notes,
            attachments: &self.attachments,
            collaborators: &self.collaborators,
            search: &self.search,
        }
    }
}

impl Default for MemDatabase {
    fn default() -> Self {
        Self::new()
    }
}

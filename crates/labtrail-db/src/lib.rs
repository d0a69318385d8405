//! # labtrail-db
//!
//! PostgreSQL database layer for the labtrail storage core.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for all core entities
//! - Application-level referential integrity and cascade deletion (the
//!   schema declares no cascading foreign keys; every cascade runs as an
//!   explicit multi-statement transaction)
//! - ILIKE-based substring search across record categories
//!
//! ## Example
//!
//! ```rust,ignore
//! use labtrail_db::{Database, CreateProjectRequest, ProjectRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/labtrail").await?;
//!
//!     let project = db.projects.create(CreateProjectRequest {
//!         name: "Lab A".to_string(),
//!         description: None,
//!         owner_id: 1,
//!     }).await?;
//!
//!     println!("Created project: {}", project.id);
//!     Ok(())
//! }
//! ```

pub mod attachments;
pub mod collaborators;
pub mod experiments;
pub mod notes;
pub mod pool;
pub mod projects;
pub mod search;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use TestDatabase
pub mod test_fixtures;

// Re-export core types
pub use labtrail_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// Re-export repository implementations
pub use attachments::PgAttachmentRepository;
pub use collaborators::PgCollaboratorRepository;
pub use experiments::PgExperimentRepository;
pub use notes::PgNoteRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use projects::PgProjectRepository;
pub use search::PgRecordSearch;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// User repository.
    pub users: PgUserRepository,
    /// Project repository, including the full cascade delete.
    pub projects: PgProjectRepository,
    /// Experiment repository.
    pub experiments: PgExperimentRepository,
    /// Note repository.
    pub notes: PgNoteRepository,
    /// Attachment repository.
    pub attachments: PgAttachmentRepository,
    /// Project collaborator repository.
    pub collaborators: PgCollaboratorRepository,
    /// Substring search provider.
    pub search: PgRecordSearch,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            users: PgUserRepository::new(pool.clone()),
            projects: PgProjectRepository::new(pool.clone()),
            experiments: PgExperimentRepository::new(pool.clone()),
            notes: PgNoteRepository::new(pool.clone()),
            attachments: PgAttachmentRepository::new(pool.clone()),
            collaborators: PgCollaboratorRepository::new(pool.clone()),
            search: PgRecordSearch::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Borrow every repository as its trait object, for code written
    /// against the abstract capability set.
    pub fn handle(&self) -> labtrail_core::conformance::BackendHandle<'_> {
        labtrail_core::conformance::BackendHandle {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("under_score"), "under\\_score");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}

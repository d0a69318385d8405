//! Substring search implementation.
//!
//! Each category matches two text fields with a case-insensitive ILIKE
//! pattern; user input is escaped so LIKE wildcards in a query match
//! literally. A blank query short-circuits to an empty result set before
//! touching the pool.

use async_trait::async_trait;
use sqlx::{Pool, Postgres, Row};
use tracing::trace;

use labtrail_core::{
    trimmed_query, Error, Experiment, Note, Project, RecordSearch, Result, SearchResults,
};

use crate::escape_like;

/// ILIKE-based search provider over the three record categories.
#[derive(Clone)]
pub struct PgRecordSearch {
    pool: Pool<Postgres>,
}

impl PgRecordSearch {
    /// Create a new PgRecordSearch with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    fn like_pattern(query: &str) -> String {
        format!("%{}%", escape_like(query))
    }
}

#[async_trait]
impl RecordSearch for PgRecordSearch {
    async fn search_projects(&self, query: &str) -> Result<Vec<Project>> {
        let Some(q) = trimmed_query(query) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            r#"
            SELECT id, name, description, owner_id, created_at_utc, updated_at_utc
            FROM project
            WHERE name ILIKE $1 ESCAPE '\'
               OR COALESCE(description, '') ILIKE $1 ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(Self::like_pattern(q))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        trace!(
            subsystem = "search",
            component = "projects",
            result_count = rows.len(),
            "Project search"
        );

        Ok(rows
            .into_iter()
            .map(|r| Project {
                id: r.get("id"),
                name: r.get("name"),
                description: r.get("description"),
                owner_id: r.get("owner_id"),
                created_at_utc: r.get("created_at_utc"),
                updated_at_utc: r.get("updated_at_utc"),
            })
            .collect())
    }

    async fn search_experiments(&self, query: &str) -> Result<Vec<Experiment>> {
        let Some(q) = trimmed_query(query) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            r#"
            SELECT id, name, description, project_id, created_at_utc, updated_at_utc
            FROM experiment
            WHERE name ILIKE $1 ESCAPE '\'
               OR COALESCE(description, '') ILIKE $1 ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(Self::like_pattern(q))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Experiment {
                id: r.get("id"),
                name: r.get("name"),
                description: r.get("description"),
                project_id: r.get("project_id"),
                created_at_utc: r.get("created_at_utc"),
                updated_at_utc: r.get("updated_at_utc"),
            })
            .collect())
    }

    async fn search_notes(&self, query: &str) -> Result<Vec<Note>> {
        let Some(q) = trimmed_query(query) else {
            return Ok(Vec::new());
        };

        let rows = sqlx::query(
            r#"
            SELECT id, title, content, experiment_id, author_id, created_at_utc, updated_at_utc
            FROM note
            WHERE title ILIKE $1 ESCAPE '\'
               OR COALESCE(content, '') ILIKE $1 ESCAPE '\'
            ORDER BY id
            "#,
        )
        .bind(Self::like_pattern(q))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|r| Note {
                id: r.get("id"),
                title: r.get("title"),
                content: r.get("content"),
                experiment_id: r.get("experiment_id"),
                author_id: r.get("author_id"),
                created_at_utc: r.get("created_at_utc"),
                updated_at_utc: r.get("updated_at_utc"),
            })
            .collect())
    }

    async fn search_all(&self, query: &str) -> Result<SearchResults> {
        // Three independent category searches; a record belongs to exactly
        // one category, so nothing to deduplicate across them.
        Ok(SearchResults {
            projects: self.search_projects(query).await?,
            experiments: self.search_experiments(query).await?,
            notes: self.search_notes(query).await?,
        })
    }
}

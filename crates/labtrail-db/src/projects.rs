//! Project repository implementation.
//!
//! Project deletion is the widest cascade in the system: experiments, their
//! notes, those notes' attachments, and the collaborator rows all go in one
//! transaction, leaf-to-root, because the schema declares no cascading
//! foreign keys.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use labtrail_core::{
    CreateProjectRequest, Error, Project, ProjectRepository, Result, UpdateProjectRequest,
};

const PROJECT_COLUMNS: &str = "id, name, description, owner_id, created_at_utc, updated_at_utc";

/// PostgreSQL implementation of ProjectRepository.
#[derive(Clone)]
pub struct PgProjectRepository {
    pool: Pool<Postgres>,
}

impl PgProjectRepository {
    /// Create a new PgProjectRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_project(r: &PgRow) -> Project {
    Project {
        id: r.get("id"),
        name: r.get("name"),
        description: r.get("description"),
        owner_id: r.get("owner_id"),
        created_at_utc: r.get("created_at_utc"),
        updated_at_utc: r.get("updated_at_utc"),
    }
}

#[async_trait]
impl ProjectRepository for PgProjectRepository {
    async fn create(&self, req: CreateProjectRequest) -> Result<Project> {
        req.validate()?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let owner_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_user WHERE id = $1)")
                .bind(req.owner_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if !owner_exists {
            return Err(Error::ReferentialIntegrity(format!(
                "owner user {} does not exist",
                req.owner_id
            )));
        }

        let row = sqlx::query(&format!(
            "INSERT INTO project (name, description, owner_id, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING {PROJECT_COLUMNS}"
        ))
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.owner_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(row_to_project(&row))
    }

    async fn get(&self, id: i64) -> Result<Option<Project>> {
        let row = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM project WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| row_to_project(&r)))
    }

    async fn list(&self) -> Result<Vec<Project>> {
        let rows = sqlx::query(&format!("SELECT {PROJECT_COLUMNS} FROM project ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_project).collect())
    }

    async fn list_for_user(&self, user_id: i64) -> Result<Vec<Project>> {
        // Two queries, unioned in memory and deduplicated by project id:
        // a user can own a project and appear in its collaborator list.
        let owned = sqlx::query(&format!(
            "SELECT {PROJECT_COLUMNS} FROM project WHERE owner_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let collaborated = sqlx::query(
            r#"
            SELECT p.id, p.name, p.description, p.owner_id, p.created_at_utc, p.updated_at_utc
            FROM project p
            JOIN project_collaborator pc ON pc.project_id = p.id
            WHERE pc.user_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        let mut seen: HashSet<i64> = HashSet::new();
        let mut projects = Vec::new();
        for row in owned.iter().chain(collaborated.iter()) {
            let project = row_to_project(row);
            if seen.insert(project.id) {
                projects.push(project);
            }
        }
        Ok(projects)
    }

    async fn update(&self, id: i64, req: UpdateProjectRequest) -> Result<Option<Project>> {
        req.validate()?;
        let now = Utc::now();

        // Build dynamic update query; updated_at_utc refreshes in the same
        // statement as the field merge.
        let mut updates = vec!["updated_at_utc = $1".to_string()];
        let mut param_count = 2;

        if req.name.is_some() {
            updates.push(format!("name = ${param_count}"));
            param_count += 1;
        }
        if req.description.is_some() {
            updates.push(format!("description = ${param_count}"));
            param_count += 1;
        }

        let query = format!(
            "UPDATE project SET {} WHERE id = ${} RETURNING {PROJECT_COLUMNS}",
            updates.join(", "),
            param_count
        );

        let mut q = sqlx::query(&query).bind(now);
        if let Some(name) = &req.name {
            q = q.bind(name);
        }
        if let Some(description) = &req.description {
            q = q.bind(description);
        }

        let row = q
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| row_to_project(&r)))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Leaf-to-root: attachments, notes, experiments, collaborator rows,
        // then the project itself.
        sqlx::query(
            "DELETE FROM attachment WHERE note_id IN (
                 SELECT id FROM note WHERE experiment_id IN (
                     SELECT id FROM experiment WHERE project_id = $1))",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        sqlx::query(
            "DELETE FROM note WHERE experiment_id IN (
                 SELECT id FROM experiment WHERE project_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        sqlx::query("DELETE FROM experiment WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        sqlx::query("DELETE FROM project_collaborator WHERE project_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM project WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        let removed = result.rows_affected() > 0;
        if removed {
            debug!(
                subsystem = "db",
                component = "projects",
                op = "cascade_delete",
                record_id = id,
                "Project subtree deleted"
            );
        }
        Ok(removed)
    }
}

//! Project collaborator repository implementation.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use labtrail_core::{
    AddCollaboratorRequest, CollaboratorRepository, Error, ProjectCollaborator, Result,
};

/// PostgreSQL implementation of CollaboratorRepository.
#[derive(Clone)]
pub struct PgCollaboratorRepository {
    pool: Pool<Postgres>,
}

impl PgCollaboratorRepository {
    /// Create a new PgCollaboratorRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_collaborator(r: &PgRow) -> ProjectCollaborator {
    ProjectCollaborator {
        id: r.get("id"),
        project_id: r.get("project_id"),
        user_id: r.get("user_id"),
        role: r.get("role"),
    }
}

#[async_trait]
impl CollaboratorRepository for PgCollaboratorRepository {
    async fn add(&self, req: AddCollaboratorRequest) -> Result<ProjectCollaborator> {
        req.validate()?;
        let role = req.role_or_default();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let project_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM project WHERE id = $1)")
                .bind(req.project_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if !project_exists {
            return Err(Error::ReferentialIntegrity(format!(
                "project {} does not exist",
                req.project_id
            )));
        }

        let user_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_user WHERE id = $1)")
                .bind(req.user_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if !user_exists {
            return Err(Error::ReferentialIntegrity(format!(
                "user {} does not exist",
                req.user_id
            )));
        }

        let already: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM project_collaborator WHERE project_id = $1 AND user_id = $2)",
        )
        .bind(req.project_id)
        .bind(req.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;
        if already {
            return Err(Error::Validation(format!(
                "user {} is already a collaborator on project {}",
                req.user_id, req.project_id
            )));
        }

        let row = sqlx::query(
            "INSERT INTO project_collaborator (project_id, user_id, role)
             VALUES ($1, $2, $3)
             RETURNING id, project_id, user_id, role",
        )
        .bind(req.project_id)
        .bind(req.user_id)
        .bind(&role)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(row_to_collaborator(&row))
    }

    async fn remove(&self, project_id: i64, user_id: i64) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM project_collaborator WHERE project_id = $1 AND user_id = $2",
        )
        .bind(project_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_for_project(&self, project_id: i64) -> Result<Vec<ProjectCollaborator>> {
        let rows = sqlx::query(
            "SELECT id, project_id, user_id, role
             FROM project_collaborator
             WHERE project_id = $1
             ORDER BY id",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_collaborator).collect())
    }
}

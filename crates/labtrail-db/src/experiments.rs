//! Experiment repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use labtrail_core::{
    CreateExperimentRequest, Error, Experiment, ExperimentRepository, Result,
    UpdateExperimentRequest,
};

const EXPERIMENT_COLUMNS: &str =
    "id, name, description, project_id, created_at_utc, updated_at_utc";

/// PostgreSQL implementation of ExperimentRepository.
#[derive(Clone)]
pub struct PgExperimentRepository {
    pool: Pool<Postgres>,
}

impl PgExperimentRepository {
    /// Create a new PgExperimentRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_experiment(r: &PgRow) -> Experiment {
    Experiment {
        id: r.get("id"),
        name: r.get("name"),
        description: r.get("description"),
        project_id: r.get("project_id"),
        created_at_utc: r.get("created_at_utc"),
        updated_at_utc: r.get("updated_at_utc"),
    }
}

async fn project_exists(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    project_id: i64,
) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM project WHERE id = $1)")
        .bind(project_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;
    Ok(exists)
}

#[async_trait]
impl ExperimentRepository for PgExperimentRepository {
    async fn create(&self, req: CreateExperimentRequest) -> Result<Experiment> {
        req.validate()?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if !project_exists(&mut tx, req.project_id).await? {
            return Err(Error::ReferentialIntegrity(format!(
                "project {} does not exist",
                req.project_id
            )));
        }

        let row = sqlx::query(&format!(
            "INSERT INTO experiment (name, description, project_id, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $4)
             RETURNING {EXPERIMENT_COLUMNS}"
        ))
        .bind(&req.name)
        .bind(&req.description)
        .bind(req.project_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(row_to_experiment(&row))
    }

    async fn get(&self, id: i64) -> Result<Option<Experiment>> {
        let row = sqlx::query(&format!(
            "SELECT {EXPERIMENT_COLUMNS} FROM experiment WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| row_to_experiment(&r)))
    }

    async fn list(&self) -> Result<Vec<Experiment>> {
        let rows = sqlx::query(&format!(
            "SELECT {EXPERIMENT_COLUMNS} FROM experiment ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_experiment).collect())
    }

    async fn list_by_project(&self, project_id: i64) -> Result<Vec<Experiment>> {
        let rows = sqlx::query(&format!(
            "SELECT {EXPERIMENT_COLUMNS} FROM experiment WHERE project_id = $1 ORDER BY id"
        ))
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_experiment).collect())
    }

    async fn update(&self, id: i64, req: UpdateExperimentRequest) -> Result<Option<Experiment>> {
        req.validate()?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Re-parenting must point at an existing project.
        if let Some(project_id) = req.project_id {
            if !project_exists(&mut tx, project_id).await? {
                return Err(Error::ReferentialIntegrity(format!(
                    "project {project_id} does not exist"
                )));
            }
        }

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
        if req.project_id.is_some() {
            updates.push(format!("project_id = ${param_count}"));
            param_count += 1;
        }

        let query = format!(
            "UPDATE experiment SET {} WHERE id = ${} RETURNING {EXPERIMENT_COLUMNS}",
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
        if let Some(project_id) = req.project_id {
            q = q.bind(project_id);
        }

        let row = q
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(row.map(|r| row_to_experiment(&r)))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            "DELETE FROM attachment WHERE note_id IN (
                 SELECT id FROM note WHERE experiment_id = $1)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        sqlx::query("DELETE FROM note WHERE experiment_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM experiment WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

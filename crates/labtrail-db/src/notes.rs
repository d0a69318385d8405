//! Note repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};

use labtrail_core::{
    CreateNoteRequest, Error, Note, NoteRepository, Result, UpdateNoteRequest,
};

const NOTE_COLUMNS: &str =
    "id, title, content, experiment_id, author_id, created_at_utc, updated_at_utc";

/// PostgreSQL implementation of NoteRepository.
#[derive(Clone)]
pub struct PgNoteRepository {
    pool: Pool<Postgres>,
}

impl PgNoteRepository {
    /// Create a new PgNoteRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_note(r: &PgRow) -> Note {
    Note {
        id: r.get("id"),
        title: r.get("title"),
        content: r.get("content"),
        experiment_id: r.get("experiment_id"),
        author_id: r.get("author_id"),
        created_at_utc: r.get("created_at_utc"),
        updated_at_utc: r.get("updated_at_utc"),
    }
}

async fn experiment_exists(tx: &mut Transaction<'_, Postgres>, experiment_id: i64) -> Result<bool> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM experiment WHERE id = $1)")
        .bind(experiment_id)
        .fetch_one(&mut **tx)
        .await
        .map_err(Error::Database)?;
    Ok(exists)
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn create(&self, req: CreateNoteRequest) -> Result<Note> {
        req.validate()?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if !experiment_exists(&mut tx, req.experiment_id).await? {
            return Err(Error::ReferentialIntegrity(format!(
                "experiment {} does not exist",
                req.experiment_id
            )));
        }

        let author_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_user WHERE id = $1)")
                .bind(req.author_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if !author_exists {
            return Err(Error::ReferentialIntegrity(format!(
                "author user {} does not exist",
                req.author_id
            )));
        }

        let row = sqlx::query(&format!(
            "INSERT INTO note (title, content, experiment_id, author_id, created_at_utc, updated_at_utc)
             VALUES ($1, $2, $3, $4, $5, $5)
             RETURNING {NOTE_COLUMNS}"
        ))
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.experiment_id)
        .bind(req.author_id)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(row_to_note(&row))
    }

    async fn get(&self, id: i64) -> Result<Option<Note>> {
        let row = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM note WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| row_to_note(&r)))
    }

    async fn list(&self) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!("SELECT {NOTE_COLUMNS} FROM note ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_note).collect())
    }

    async fn list_by_experiment(&self, experiment_id: i64) -> Result<Vec<Note>> {
        let rows = sqlx::query(&format!(
            "SELECT {NOTE_COLUMNS} FROM note WHERE experiment_id = $1 ORDER BY id"
        ))
        .bind(experiment_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_note).collect())
    }

    async fn update(&self, id: i64, req: UpdateNoteRequest) -> Result<Option<Note>> {
        req.validate()?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        // Re-parenting must point at an existing experiment.
        if let Some(experiment_id) = req.experiment_id {
            if !experiment_exists(&mut tx, experiment_id).await? {
                return Err(Error::ReferentialIntegrity(format!(
                    "experiment {experiment_id} does not exist"
                )));
            }
        }

        let mut updates = vec!["updated_at_utc = $1".to_string()];
        let mut param_count = 2;

        if req.title.is_some() {
            updates.push(format!("title = ${param_count}"));
            param_count += 1;
        }
        if req.content.is_some() {
            updates.push(format!("content = ${param_count}"));
            param_count += 1;
        }
        if req.experiment_id.is_some() {
            updates.push(format!("experiment_id = ${param_count}"));
            param_count += 1;
        }

        let query = format!(
            "UPDATE note SET {} WHERE id = ${} RETURNING {NOTE_COLUMNS}",
            updates.join(", "),
            param_count
        );

        let mut q = sqlx::query(&query).bind(now);
        if let Some(title) = &req.title {
            q = q.bind(title);
        }
        if let Some(content) = &req.content {
            q = q.bind(content);
        }
        if let Some(experiment_id) = req.experiment_id {
            q = q.bind(experiment_id);
        }

        let row = q
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(row.map(|r| row_to_note(&r)))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query("DELETE FROM attachment WHERE note_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM note WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

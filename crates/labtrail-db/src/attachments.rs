//! Attachment repository implementation.
//!
//! Payloads are stored inline as BYTEA and held fully in memory during
//! create and download; the size cap is enforced at validation time before
//! anything reaches the pool. Each payload carries a BLAKE3 content hash
//! computed at create time.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};
use tracing::debug;

use labtrail_core::{
    compute_content_hash, Attachment, AttachmentRepository, AttachmentSummary,
    CreateAttachmentRequest, Error, Result,
};

/// PostgreSQL implementation of AttachmentRepository.
#[derive(Clone)]
pub struct PgAttachmentRepository {
    pool: Pool<Postgres>,
}

impl PgAttachmentRepository {
    /// Create a new PgAttachmentRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_summary(r: &PgRow) -> AttachmentSummary {
    AttachmentSummary {
        id: r.get("id"),
        note_id: r.get("note_id"),
        file_name: r.get("file_name"),
        file_type: r.get("file_type"),
        file_size: r.get("file_size"),
        content_hash: r.get("content_hash"),
        created_at_utc: r.get("created_at_utc"),
    }
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    async fn create(&self, req: CreateAttachmentRequest) -> Result<Attachment> {
        req.validate()?;
        let now = Utc::now();
        let file_name = req.safe_file_name();
        let content_hash = compute_content_hash(&req.file_data);

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let note_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM note WHERE id = $1)")
                .bind(req.note_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if !note_exists {
            return Err(Error::ReferentialIntegrity(format!(
                "note {} does not exist",
                req.note_id
            )));
        }

        let row = sqlx::query(
            r#"
            INSERT INTO attachment (note_id, file_name, file_type, file_size, content_hash, file_data, created_at_utc)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, created_at_utc
            "#,
        )
        .bind(req.note_id)
        .bind(&file_name)
        .bind(&req.file_type)
        .bind(req.file_size)
        .bind(&content_hash)
        .bind(&req.file_data)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;

        debug!(
            subsystem = "db",
            component = "attachments",
            op = "create",
            db_table = "attachment",
            file_name = %file_name,
            size = req.file_size,
            "Attachment stored"
        );

        Ok(Attachment {
            id: row.get("id"),
            note_id: req.note_id,
            file_name,
            file_type: req.file_type,
            file_size: req.file_size,
            content_hash,
            file_data: req.file_data,
            created_at_utc: row.get("created_at_utc"),
        })
    }

    async fn get(&self, id: i64) -> Result<Option<Attachment>> {
        let row = sqlx::query(
            r#"
            SELECT id, note_id, file_name, file_type, file_size, content_hash, file_data, created_at_utc
            FROM attachment
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| Attachment {
            id: r.get("id"),
            note_id: r.get("note_id"),
            file_name: r.get("file_name"),
            file_type: r.get("file_type"),
            file_size: r.get("file_size"),
            content_hash: r.get("content_hash"),
            file_data: r.get("file_data"),
            created_at_utc: r.get("created_at_utc"),
        }))
    }

    async fn list_by_note(&self, note_id: i64) -> Result<Vec<AttachmentSummary>> {
        // Listing never ships payload bytes.
        let rows = sqlx::query(
            r#"
            SELECT id, note_id, file_name, file_type, file_size, content_hash, created_at_utc
            FROM attachment
            WHERE note_id = $1
            ORDER BY id
            "#,
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_summary).collect())
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM attachment WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

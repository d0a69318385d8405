//! User repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row};

use labtrail_core::{
    CreateUserRequest, Error, Result, UpdateUserRequest, User, UserRepository,
};

const USER_COLUMNS: &str = "id, username, display_name, role, created_at_utc";

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    /// Create a new PgUserRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_user(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        username: r.get("username"),
        display_name: r.get("display_name"),
        role: r.get("role"),
        created_at_utc: r.get("created_at_utc"),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, req: CreateUserRequest) -> Result<User> {
        req.validate()?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let taken: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM app_user WHERE username = $1)")
                .bind(&req.username)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if taken {
            return Err(Error::Validation(format!(
                "username {:?} is already taken",
                req.username
            )));
        }

        let row = sqlx::query(&format!(
            "INSERT INTO app_user (username, display_name, role, created_at_utc)
             VALUES ($1, $2, $3, $4)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&req.username)
        .bind(&req.display_name)
        .bind(&req.role)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(row_to_user(&row))
    }

    async fn get(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM app_user WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM app_user WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM app_user ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows.iter().map(row_to_user).collect())
    }

    async fn update(&self, id: i64, req: UpdateUserRequest) -> Result<Option<User>> {
        if req.display_name.is_none() && req.role.is_none() {
            return self.get(id).await;
        }

        // Build dynamic update query
        let mut updates = Vec::new();
        let mut param_count = 1;

        if req.display_name.is_some() {
            updates.push(format!("display_name = ${param_count}"));
            param_count += 1;
        }
        if req.role.is_some() {
            updates.push(format!("role = ${param_count}"));
            param_count += 1;
        }

        let query = format!(
            "UPDATE app_user SET {} WHERE id = ${} RETURNING {USER_COLUMNS}",
            updates.join(", "),
            param_count
        );

        let mut q = sqlx::query(&query);
        if let Some(display_name) = &req.display_name {
            q = q.bind(display_name);
        }
        if let Some(role) = &req.role {
            q = q.bind(role);
        }

        let row = q
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(row.map(|r| row_to_user(&r)))
    }

    async fn delete(&self, id: i64) -> Result<bool> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let owns_projects: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM project WHERE owner_id = $1)")
                .bind(id)
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
        if owns_projects {
            return Err(Error::ReferentialIntegrity(format!(
                "user {id} still owns projects"
            )));
        }

        sqlx::query("DELETE FROM project_collaborator WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        let result = sqlx::query("DELETE FROM app_user WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;

        tx.commit().await.map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }
}

//! User repository implementation

use sqlx::PgPool;

use crate::models::user::User;
use crate::utils::errors::AfishaError;

#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, name: &str, email: &str) -> Result<User, AfishaError> {
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email) VALUES ($1, $2) RETURNING id, name, email",
        )
        .bind(name)
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AfishaError> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AfishaError> {
        let user = sqlx::query_as::<_, User>("SELECT id, name, email FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn delete(&self, id: i64) -> Result<u64, AfishaError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// List users, optionally restricted to an id set
    pub async fn list(
        &self,
        ids: Option<&[i64]>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, AfishaError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email FROM users
            WHERE ($1::bigint[] IS NULL OR id = ANY($1))
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(ids)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}

//! Compilation repository implementation

use sqlx::{PgPool, Postgres, Transaction};

use crate::models::compilation::Compilation;
use crate::utils::errors::AfishaError;

#[derive(Clone)]
pub struct CompilationRepository {
    pool: PgPool,
}

impl CompilationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        title: &str,
        pinned: bool,
    ) -> Result<Compilation, AfishaError> {
        let compilation = sqlx::query_as::<_, Compilation>(
            "INSERT INTO compilations (title, pinned) VALUES ($1, $2) RETURNING id, title, pinned",
        )
        .bind(title)
        .bind(pinned)
        .fetch_one(&mut **tx)
        .await?;

        Ok(compilation)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Compilation>, AfishaError> {
        let compilation = sqlx::query_as::<_, Compilation>(
            "SELECT id, title, pinned FROM compilations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(compilation)
    }

    pub async fn update(
        &self,
        id: i64,
        title: &str,
        pinned: bool,
    ) -> Result<Compilation, AfishaError> {
        let compilation = sqlx::query_as::<_, Compilation>(
            "UPDATE compilations SET title = $2, pinned = $3 WHERE id = $1 \
             RETURNING id, title, pinned",
        )
        .bind(id)
        .bind(title)
        .bind(pinned)
        .fetch_one(&self.pool)
        .await?;

        Ok(compilation)
    }

    pub async fn delete(&self, id: i64) -> Result<(), AfishaError> {
        sqlx::query("DELETE FROM compilations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// List compilations, optionally filtered by the pinned flag
    pub async fn list(
        &self,
        pinned: Option<bool>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Compilation>, AfishaError> {
        let compilations = sqlx::query_as::<_, Compilation>(
            r#"
            SELECT id, title, pinned FROM compilations
            WHERE ($1::boolean IS NULL OR pinned = $1)
            ORDER BY id
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pinned)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(compilations)
    }

    /// Member event ids of one compilation
    pub async fn find_event_ids(&self, compilation_id: i64) -> Result<Vec<i64>, AfishaError> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            "SELECT event_id FROM compilation_events WHERE compilation_id = $1 ORDER BY event_id",
        )
        .bind(compilation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// Replace the member event set of one compilation
    pub async fn replace_events(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        compilation_id: i64,
        event_ids: &[i64],
    ) -> Result<(), AfishaError> {
        sqlx::query("DELETE FROM compilation_events WHERE compilation_id = $1")
            .bind(compilation_id)
            .execute(&mut **tx)
            .await?;

        for event_id in event_ids {
            sqlx::query(
                "INSERT INTO compilation_events (compilation_id, event_id) VALUES ($1, $2)",
            )
            .bind(compilation_id)
            .bind(event_id)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

//! Participation request repository implementation

use chrono::Utc;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::request::{ParticipationRequest, RequestStatus};
use crate::utils::errors::AfishaError;

const SELECT_REQUEST: &str =
    "SELECT id, event_id, requester_id, created, status FROM requests";

#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new request inside an admission transaction
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
        requester_id: i64,
        status: RequestStatus,
    ) -> Result<ParticipationRequest, AfishaError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(
            r#"
            INSERT INTO requests (event_id, requester_id, created, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id, event_id, requester_id, created, status
            "#,
        )
        .bind(event_id)
        .bind(requester_id)
        .bind(Utc::now())
        .bind(status)
        .fetch_one(&mut **tx)
        .await?;

        Ok(request)
    }

    /// Find request by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<ParticipationRequest>, AfishaError> {
        let request =
            sqlx::query_as::<_, ParticipationRequest>(&format!("{} WHERE id = $1", SELECT_REQUEST))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(request)
    }

    /// All requests filed by one user
    pub async fn find_by_requester(
        &self,
        requester_id: i64,
    ) -> Result<Vec<ParticipationRequest>, AfishaError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "{} WHERE requester_id = $1 ORDER BY id",
            SELECT_REQUEST
        ))
        .bind(requester_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// The requester's non-canceled request for an event, if any
    pub async fn find_active_by_requester_and_event(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        requester_id: i64,
        event_id: i64,
    ) -> Result<Option<ParticipationRequest>, AfishaError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "{} WHERE requester_id = $1 AND event_id = $2 AND status <> 'CANCELED'",
            SELECT_REQUEST
        ))
        .bind(requester_id)
        .bind(event_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(request)
    }

    /// All requests targeting one event
    pub async fn find_by_event(
        &self,
        event_id: i64,
    ) -> Result<Vec<ParticipationRequest>, AfishaError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "{} WHERE event_id = $1 ORDER BY id",
            SELECT_REQUEST
        ))
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(requests)
    }

    /// Targeted requests of one event, locked for the batch transaction
    pub async fn find_by_event_and_ids_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
        ids: &[i64],
    ) -> Result<Vec<ParticipationRequest>, AfishaError> {
        let requests = sqlx::query_as::<_, ParticipationRequest>(&format!(
            "{} WHERE event_id = $1 AND id = ANY($2) FOR UPDATE",
            SELECT_REQUEST
        ))
        .bind(event_id)
        .bind(ids)
        .fetch_all(&mut **tx)
        .await?;

        Ok(requests)
    }

    /// Update one request's status
    pub async fn update_status(
        &self,
        request_id: i64,
        status: RequestStatus,
    ) -> Result<ParticipationRequest, AfishaError> {
        let request = sqlx::query_as::<_, ParticipationRequest>(
            r#"
            UPDATE requests
            SET status = $2
            WHERE id = $1
            RETURNING id, event_id, requester_id, created, status
            "#,
        )
        .bind(request_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(request)
    }

    /// Move a set of requests to one status inside a batch transaction
    pub async fn update_statuses(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ids: &[i64],
        status: RequestStatus,
    ) -> Result<(), AfishaError> {
        if ids.is_empty() {
            return Ok(());
        }
        sqlx::query("UPDATE requests SET status = $2 WHERE id = ANY($1)")
            .bind(ids)
            .bind(status)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Confirmed-request counts grouped by event
    pub async fn count_confirmed_for_events(
        &self,
        event_ids: &[i64],
    ) -> Result<Vec<(i64, i64)>, AfishaError> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }
        let counts: Vec<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT event_id, COUNT(*)
            FROM requests
            WHERE event_id = ANY($1) AND status = 'CONFIRMED'
            GROUP BY event_id
            "#,
        )
        .bind(event_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}

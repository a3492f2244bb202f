//! Event repository implementation

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::event::{Event, EventSort, EventState, NewEventRequest};
use crate::utils::errors::AfishaError;

/// Shared SELECT head joining the names an event view needs
const SELECT_EVENT: &str = "SELECT e.id, e.annotation, e.category_id, c.name AS category_name, \
    e.confirmed_requests, e.created_on, e.description, e.event_date, e.initiator_id, \
    u.name AS initiator_name, e.latitude, e.longitude, e.paid, e.participant_limit, \
    e.published_on, e.request_moderation, e.state, e.title, e.views \
    FROM events e \
    JOIN categories c ON c.id = e.category_id \
    JOIN users u ON u.id = e.initiator_id";

/// Admin listing filter; `None` members match everything
#[derive(Debug, Clone, Default)]
pub struct AdminEventFilter {
    pub initiator_ids: Option<Vec<i64>>,
    pub states: Option<Vec<EventState>>,
    pub category_ids: Option<Vec<i64>>,
    pub range_start: Option<DateTime<Utc>>,
    pub range_end: Option<DateTime<Utc>>,
}

/// Public listing filter; only published events are ever matched
#[derive(Debug, Clone)]
pub struct PublicEventFilter {
    pub text: Option<String>,
    pub category_ids: Option<Vec<i64>>,
    pub paid: Option<bool>,
    pub range_start: DateTime<Utc>,
    pub range_end: Option<DateTime<Utc>>,
    pub only_available: bool,
    pub sort: EventSort,
}

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new event in PENDING state
    pub async fn create(
        &self,
        initiator_id: i64,
        category_id: i64,
        request: &NewEventRequest,
        created_on: DateTime<Utc>,
    ) -> Result<Event, AfishaError> {
        let inserted: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO events (annotation, category_id, confirmed_requests, created_on,
                                description, event_date, initiator_id, latitude, longitude,
                                paid, participant_limit, published_on, request_moderation,
                                state, title, views)
            VALUES ($1, $2, 0, $3, $4, $5, $6, $7, $8, $9, $10, NULL, $11, $12, $13, 0)
            RETURNING id
            "#,
        )
        .bind(&request.annotation)
        .bind(category_id)
        .bind(created_on)
        .bind(&request.description)
        .bind(request.event_date)
        .bind(initiator_id)
        .bind(request.location.lat)
        .bind(request.location.lon)
        .bind(request.paid)
        .bind(request.participant_limit)
        .bind(request.request_moderation)
        .bind(EventState::Pending)
        .bind(&request.title)
        .fetch_one(&self.pool)
        .await?;

        self.find_by_id(inserted.0)
            .await?
            .ok_or(AfishaError::EventNotFound {
                event_id: inserted.0,
            })
    }

    /// Find event by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Event>, AfishaError> {
        let event = sqlx::query_as::<_, Event>(&format!("{} WHERE e.id = $1", SELECT_EVENT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(event)
    }

    /// Find event by ID, locking its row for the rest of the transaction
    ///
    /// Serializes concurrent admission against the same event so the
    /// confirmed counter cannot oversell the participant limit.
    pub async fn find_by_id_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> Result<Option<Event>, AfishaError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "{} WHERE e.id = $1 FOR UPDATE OF e",
            SELECT_EVENT
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(event)
    }

    /// Persist every mutable field of an event
    pub async fn update(&self, event: &Event) -> Result<Event, AfishaError> {
        sqlx::query(
            r#"
            UPDATE events
            SET annotation = $2,
                category_id = $3,
                description = $4,
                event_date = $5,
                latitude = $6,
                longitude = $7,
                paid = $8,
                participant_limit = $9,
                published_on = $10,
                request_moderation = $11,
                state = $12,
                title = $13
            WHERE id = $1
            "#,
        )
        .bind(event.id)
        .bind(&event.annotation)
        .bind(event.category_id)
        .bind(&event.description)
        .bind(event.event_date)
        .bind(event.latitude)
        .bind(event.longitude)
        .bind(event.paid)
        .bind(event.participant_limit)
        .bind(event.published_on)
        .bind(event.request_moderation)
        .bind(event.state)
        .bind(&event.title)
        .execute(&self.pool)
        .await?;

        self.find_by_id(event.id)
            .await?
            .ok_or(AfishaError::EventNotFound { event_id: event.id })
    }

    /// Rewrite the confirmed counter inside an admission transaction
    pub async fn set_confirmed_requests(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event_id: i64,
        confirmed_requests: i32,
    ) -> Result<(), AfishaError> {
        sqlx::query("UPDATE events SET confirmed_requests = $2 WHERE id = $1")
            .bind(event_id)
            .bind(confirmed_requests)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Overwrite the stored view counter (last write wins)
    pub async fn set_views(&self, event_id: i64, views: i64) -> Result<(), AfishaError> {
        sqlx::query("UPDATE events SET views = $2 WHERE id = $1")
            .bind(event_id)
            .bind(views)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Admin listing with optional filters and pagination
    pub async fn find_admin_filtered(
        &self,
        filter: &AdminEventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, AfishaError> {
        let states: Option<Vec<String>> = filter
            .states
            .as_ref()
            .map(|s| s.iter().map(|state| state.as_str().to_string()).collect());

        let events = sqlx::query_as::<_, Event>(&format!(
            r#"{}
            WHERE ($1::bigint[] IS NULL OR e.initiator_id = ANY($1))
              AND ($2::text[] IS NULL OR e.state = ANY($2))
              AND ($3::bigint[] IS NULL OR e.category_id = ANY($3))
              AND ($4::timestamptz IS NULL OR e.event_date >= $4)
              AND ($5::timestamptz IS NULL OR e.event_date <= $5)
            ORDER BY e.id
            LIMIT $6 OFFSET $7
            "#,
            SELECT_EVENT
        ))
        .bind(&filter.initiator_ids)
        .bind(&states)
        .bind(&filter.category_ids)
        .bind(filter.range_start)
        .bind(filter.range_end)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Public listing over published events only
    pub async fn find_public_filtered(
        &self,
        filter: &PublicEventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, AfishaError> {
        let order_by = match filter.sort {
            EventSort::EventDate => "e.event_date DESC",
            EventSort::Views => "e.views DESC",
        };

        let events = sqlx::query_as::<_, Event>(&format!(
            r#"{}
            WHERE e.state = 'PUBLISHED'
              AND ($1::text IS NULL
                   OR LOWER(e.annotation) LIKE '%' || LOWER($1) || '%'
                   OR LOWER(e.description) LIKE '%' || LOWER($1) || '%')
              AND ($2::bigint[] IS NULL OR e.category_id = ANY($2))
              AND ($3::boolean IS NULL OR e.paid = $3)
              AND e.event_date >= $4
              AND ($5::timestamptz IS NULL OR e.event_date <= $5)
              AND (NOT $6 OR e.participant_limit = 0
                   OR e.confirmed_requests < e.participant_limit)
            ORDER BY {}
            LIMIT $7 OFFSET $8
            "#,
            SELECT_EVENT, order_by
        ))
        .bind(&filter.text)
        .bind(&filter.category_ids)
        .bind(filter.paid)
        .bind(filter.range_start)
        .bind(filter.range_end)
        .bind(filter.only_available)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Events created by one initiator, paginated
    pub async fn find_by_initiator(
        &self,
        initiator_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, AfishaError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "{} WHERE e.initiator_id = $1 ORDER BY e.id LIMIT $2 OFFSET $3",
            SELECT_EVENT
        ))
        .bind(initiator_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// One event, visible only to its initiator
    pub async fn find_by_initiator_and_id(
        &self,
        initiator_id: i64,
        event_id: i64,
    ) -> Result<Option<Event>, AfishaError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "{} WHERE e.initiator_id = $1 AND e.id = $2",
            SELECT_EVENT
        ))
        .bind(initiator_id)
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// Events by id set, used to resolve compilation members
    pub async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<Event>, AfishaError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let events = sqlx::query_as::<_, Event>(&format!(
            "{} WHERE e.id = ANY($1) ORDER BY e.id",
            SELECT_EVENT
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Whether any event still references the category
    pub async fn exists_by_category(&self, category_id: i64) -> Result<bool, AfishaError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events WHERE category_id = $1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0 > 0)
    }
}

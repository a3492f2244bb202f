//! Event service implementation
//!
//! Lifecycle operations (create, moderate, update), the batch admission
//! entry point for organizers, and the admin/public/owner query engine
//! with view-count enrichment from the statistics service.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::database::repositories::event::{AdminEventFilter, PublicEventFilter};
use crate::database::DatabaseService;
use crate::domain::lifecycle::{self, LeadTimes};
use crate::domain::admission;
use crate::models::category::Category;
use crate::models::event::{
    Event, EventFullView, EventShortView, EventSort, EventState, NewEventRequest,
    UpdateEventAdminRequest, UpdateEventUserRequest,
};
use crate::models::request::{
    ParticipationRequestView, RequestStatus, RequestStatusUpdateRequest, RequestStatusUpdateResult,
};
use crate::services::page_params;
use crate::services::stats::{event_id_from_uri, StatsClient};
use crate::utils::datetime::parse_range;
use crate::utils::errors::{AfishaError, Result};

/// Admin listing parameters, range bounds as boundary-format strings
#[derive(Debug, Clone, Default)]
pub struct AdminSearchParams {
    pub users: Option<Vec<i64>>,
    pub states: Option<Vec<String>>,
    pub categories: Option<Vec<i64>>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    pub from: i64,
    pub size: i64,
}

/// Public listing parameters
#[derive(Debug, Clone, Default)]
pub struct PublicSearchParams {
    pub text: Option<String>,
    pub categories: Option<Vec<i64>>,
    pub paid: Option<bool>,
    pub range_start: Option<String>,
    pub range_end: Option<String>,
    pub only_available: bool,
    pub sort: Option<String>,
    pub from: i64,
    pub size: i64,
}

/// Event service for lifecycle, admission and queries
#[derive(Clone)]
pub struct EventService {
    db: DatabaseService,
    stats: StatsClient,
    lead_times: LeadTimes,
}

impl EventService {
    /// Create a new EventService instance
    pub fn new(db: DatabaseService, stats: StatsClient, settings: &Settings) -> Self {
        Self {
            db,
            stats,
            lead_times: LeadTimes::from_config(&settings.lifecycle),
        }
    }

    /// Create a new event in PENDING state on behalf of its initiator
    pub async fn create_event(
        &self,
        user_id: i64,
        request: NewEventRequest,
    ) -> Result<EventFullView> {
        let now = Utc::now();
        lifecycle::validate_new_event(&request, now, self.lead_times)?;

        self.require_user(user_id).await?;
        let category = self.require_category(request.category).await?;

        let event = self
            .db
            .events
            .create(user_id, category.id, &request, now)
            .await?;
        info!(event_id = event.id, initiator_id = user_id, "Event created");

        Ok(EventFullView::from(event))
    }

    /// Public fetch of one published event
    ///
    /// Records a page hit and synchronously refreshes the stored view
    /// counter from the statistics service before returning.
    pub async fn get_public_event(
        &self,
        event_id: i64,
        uri: &str,
        client_ip: &str,
    ) -> Result<EventFullView> {
        let mut event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(AfishaError::EventNotFound { event_id })?;
        if event.state != EventState::Published {
            // unpublished events are invisible to the public, state not leaked
            return Err(AfishaError::EventNotFound { event_id });
        }

        self.stats.record_hit(uri, client_ip).await;

        let window_start = event.published_on.unwrap_or(event.created_on);
        match self
            .stats
            .fetch_stats(window_start, Utc::now(), &[uri.to_string()], true)
            .await
        {
            Ok(stats) => {
                if let Some(entry) = stats.first() {
                    event.views = entry.hits;
                    self.db.events.set_views(event.id, entry.hits).await?;
                }
            }
            Err(e) => {
                warn!(event_id = event_id, error = %e, "View refresh failed, serving stored count");
            }
        }

        debug!(event_id = event_id, "Public event fetched");
        Ok(EventFullView::from(event))
    }

    /// Admin listing with fresh confirmed counts and view counts
    pub async fn find_admin_events(
        &self,
        params: AdminSearchParams,
    ) -> Result<Vec<EventFullView>> {
        let (limit, offset) = page_params(params.from, params.size)?;
        let (range_start, range_end) =
            parse_range(params.range_start.as_deref(), params.range_end.as_deref())?;
        let states = params
            .states
            .map(|names| {
                names
                    .iter()
                    .map(|name| name.parse::<EventState>())
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        let filter = AdminEventFilter {
            initiator_ids: params.users,
            states,
            category_ids: params.categories,
            range_start,
            range_end,
        };
        let events = self.db.events.find_admin_filtered(&filter, limit, offset).await?;
        let events = self.enrich(events).await?;

        Ok(events.into_iter().map(EventFullView::from).collect())
    }

    /// Public listing over published events
    ///
    /// Records a hit for the triggering request as a side effect.
    pub async fn find_public_events(
        &self,
        params: PublicSearchParams,
        uri: &str,
        client_ip: &str,
    ) -> Result<Vec<EventShortView>> {
        let (limit, offset) = page_params(params.from, params.size)?;
        let (range_start, range_end) =
            parse_range(params.range_start.as_deref(), params.range_end.as_deref())?;
        let sort = params
            .sort
            .as_deref()
            .map(str::parse::<EventSort>)
            .transpose()?
            .unwrap_or(EventSort::EventDate);

        let filter = PublicEventFilter {
            text: params.text,
            category_ids: params.categories,
            paid: params.paid,
            // past events are excluded unless the caller widens the range
            range_start: range_start.unwrap_or_else(Utc::now),
            range_end,
            only_available: params.only_available,
            sort,
        };
        let events = self.db.events.find_public_filtered(&filter, limit, offset).await?;

        self.stats.record_hit(uri, client_ip).await;

        let events = self.enrich(events).await?;
        Ok(events.into_iter().map(EventShortView::from).collect())
    }

    /// Paginated short-form list of the initiator's own events
    pub async fn find_user_events(
        &self,
        user_id: i64,
        from: i64,
        size: i64,
    ) -> Result<Vec<EventShortView>> {
        let (limit, offset) = page_params(from, size)?;
        self.require_user(user_id).await?;
        let events = self.db.events.find_by_initiator(user_id, limit, offset).await?;

        Ok(events.into_iter().map(EventShortView::from).collect())
    }

    /// Full view of one own event
    pub async fn get_user_event(&self, user_id: i64, event_id: i64) -> Result<EventFullView> {
        self.require_user(user_id).await?;
        let event = self
            .db
            .events
            .find_by_initiator_and_id(user_id, event_id)
            .await?
            .ok_or(AfishaError::EventNotFound { event_id })?;

        Ok(EventFullView::from(event))
    }

    /// Admin update: partial fields plus an optional moderation action
    pub async fn update_event_admin(
        &self,
        event_id: i64,
        request: UpdateEventAdminRequest,
    ) -> Result<EventFullView> {
        let now = Utc::now();
        lifecycle::validate_update_fields(&request.fields)?;
        if let Some(event_date) = request.fields.event_date {
            lifecycle::validate_event_date(event_date, now, self.lead_times.event_min_lead)?;
        }

        let mut event = self
            .db
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(AfishaError::EventNotFound { event_id })?;

        // transition legality is checked against the stored date before
        // any field is touched
        let transition = request
            .state_action
            .map(|action| {
                lifecycle::admin_transition(
                    event.state,
                    event.event_date,
                    action,
                    now,
                    self.lead_times,
                )
            })
            .transpose()?;

        let category = self.resolve_category(request.fields.category).await?;
        let mut changed = lifecycle::apply_field_updates(&mut event, &request.fields, category);
        if let Some(event_date) = request.fields.event_date {
            event.event_date = event_date;
            changed = true;
        }
        if let Some(transition) = transition {
            event.state = transition.state;
            if transition.published_on.is_some() {
                event.published_on = transition.published_on;
            }
            changed = true;
            info!(
                event_id = event_id,
                state = transition.state.as_str(),
                "Event moderated"
            );
        }

        if !changed {
            debug!(event_id = event_id, "Admin update changed nothing");
            return Ok(EventFullView::from(event));
        }

        let event = self.db.events.update(&event).await?;
        Ok(EventFullView::from(event))
    }

    /// Initiator update: refused outright while the event is published
    pub async fn update_event_user(
        &self,
        user_id: i64,
        event_id: i64,
        request: UpdateEventUserRequest,
    ) -> Result<EventFullView> {
        let now = Utc::now();
        lifecycle::validate_update_fields(&request.fields)?;
        if let Some(event_date) = request.fields.event_date {
            lifecycle::validate_event_date(event_date, now, self.lead_times.event_min_lead)?;
        }

        self.require_user(user_id).await?;
        let mut event = self
            .db
            .events
            .find_by_initiator_and_id(user_id, event_id)
            .await?
            .ok_or(AfishaError::EventNotFound { event_id })?;
        if event.state == EventState::Published {
            return Err(AfishaError::Conflict(
                "A published event cannot be edited by its initiator".to_string(),
            ));
        }

        let category = self.resolve_category(request.fields.category).await?;
        let mut changed = lifecycle::apply_field_updates(&mut event, &request.fields, category);
        if let Some(event_date) = request.fields.event_date {
            event.event_date = event_date;
            changed = true;
        }
        if let Some(action) = request.state_action {
            let next = lifecycle::user_transition(event.state, action)?;
            if next != event.state {
                event.state = next;
            }
            changed = true;
            info!(
                event_id = event_id,
                initiator_id = user_id,
                state = event.state.as_str(),
                "Review action applied"
            );
        }

        if !changed {
            debug!(event_id = event_id, "Initiator update changed nothing");
            return Ok(EventFullView::from(event));
        }

        let event = self.db.events.update(&event).await?;
        Ok(EventFullView::from(event))
    }

    /// Requests targeting one of the initiator's events
    pub async fn list_event_requests(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> Result<Vec<ParticipationRequestView>> {
        self.require_user(user_id).await?;
        self.db
            .events
            .find_by_initiator_and_id(user_id, event_id)
            .await?
            .ok_or(AfishaError::EventNotFound { event_id })?;

        let requests = self.db.requests.find_by_event(event_id).await?;
        Ok(requests
            .into_iter()
            .map(ParticipationRequestView::from)
            .collect())
    }

    /// Batch admission: organizer confirms or rejects pending requests
    ///
    /// Runs inside one transaction holding the event row lock, so
    /// concurrent admission against the same event serializes and either
    /// the whole batch commits or none of it does.
    pub async fn update_request_statuses(
        &self,
        user_id: i64,
        event_id: i64,
        update: RequestStatusUpdateRequest,
    ) -> Result<RequestStatusUpdateResult> {
        self.require_user(user_id).await?;

        let mut tx = self.db.begin().await?;
        let event = self
            .db
            .events
            .find_by_id_for_update(&mut tx, event_id)
            .await?
            .ok_or(AfishaError::EventNotFound { event_id })?;
        if event.initiator_id != user_id {
            return Err(AfishaError::InvalidInput(format!(
                "User {} is not the initiator of event {}",
                user_id, event_id
            )));
        }

        let fetched = self
            .db
            .requests
            .find_by_event_and_ids_for_update(&mut tx, event_id, &update.request_ids)
            .await?;
        let mut by_id: HashMap<i64, _> = fetched.into_iter().map(|r| (r.id, r)).collect();
        // caller order is the processing order
        let mut ordered = Vec::with_capacity(update.request_ids.len());
        for request_id in &update.request_ids {
            let request = by_id
                .remove(request_id)
                .ok_or(AfishaError::RequestNotFound {
                    request_id: *request_id,
                })?;
            ordered.push(request);
        }

        let outcome = admission::admit_batch(&event, ordered, update.status)?;

        let confirmed_ids: Vec<i64> = outcome.confirmed.iter().map(|r| r.id).collect();
        let rejected_ids: Vec<i64> = outcome.rejected.iter().map(|r| r.id).collect();
        self.db
            .requests
            .update_statuses(&mut tx, &confirmed_ids, RequestStatus::Confirmed)
            .await?;
        self.db
            .requests
            .update_statuses(&mut tx, &rejected_ids, RequestStatus::Rejected)
            .await?;
        self.db
            .events
            .set_confirmed_requests(&mut tx, event_id, outcome.new_confirmed_count)
            .await?;
        tx.commit().await?;

        info!(
            event_id = event_id,
            confirmed = confirmed_ids.len(),
            rejected = rejected_ids.len(),
            "Batch admission applied"
        );

        Ok(RequestStatusUpdateResult {
            confirmed_requests: outcome
                .confirmed
                .into_iter()
                .map(ParticipationRequestView::from)
                .collect(),
            rejected_requests: outcome
                .rejected
                .into_iter()
                .map(ParticipationRequestView::from)
                .collect(),
        })
    }

    /// Replace stored confirmed counts with a grouped lookup and stored
    /// view counters with fresh statistics, degrading on stats failure
    async fn enrich(&self, mut events: Vec<Event>) -> Result<Vec<Event>> {
        if events.is_empty() {
            return Ok(events);
        }

        let event_ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        let confirmed: HashMap<i64, i64> = self
            .db
            .requests
            .count_confirmed_for_events(&event_ids)
            .await?
            .into_iter()
            .collect();
        for event in &mut events {
            event.confirmed_requests = confirmed.get(&event.id).copied().unwrap_or(0) as i32;
        }

        let now = Utc::now();
        let window_start = events
            .iter()
            .map(|e| e.published_on.unwrap_or(e.created_on))
            .min()
            .unwrap_or(now);
        let uris: Vec<String> = event_ids.iter().map(|id| format!("/events/{}", id)).collect();
        match self.stats.fetch_stats(window_start, now, &uris, true).await {
            Ok(stats) => {
                let views: HashMap<i64, i64> = stats
                    .iter()
                    .filter_map(|entry| event_id_from_uri(&entry.uri).map(|id| (id, entry.hits)))
                    .collect();
                for event in &mut events {
                    if let Some(hits) = views.get(&event.id) {
                        event.views = *hits;
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "View enrichment failed, serving stored counts");
            }
        }

        Ok(events)
    }

    async fn require_user(&self, user_id: i64) -> Result<()> {
        self.db
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AfishaError::UserNotFound { user_id })?;
        Ok(())
    }

    async fn require_category(&self, category_id: i64) -> Result<Category> {
        self.db
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or(AfishaError::CategoryNotFound { category_id })
    }

    async fn resolve_category(&self, category_id: Option<i64>) -> Result<Option<Category>> {
        match category_id {
            Some(id) => Ok(Some(self.require_category(id).await?)),
            None => Ok(None),
        }
    }
}

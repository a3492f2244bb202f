//! Participation request service implementation
//!
//! Single-request admission at creation time and requester-side
//! cancellation. Admission runs against a locked event row so the
//! confirmed counter cannot oversell the participant limit under
//! concurrent joins.

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::domain::admission;
use crate::models::request::{ParticipationRequestView, RequestStatus};
use crate::utils::errors::{AfishaError, Result};

/// Service for managing participation requests
#[derive(Clone)]
pub struct RequestService {
    db: DatabaseService,
}

impl RequestService {
    /// Create a new RequestService instance
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// File a participation request for an event
    ///
    /// Depending on the event's limit and moderation flag the request is
    /// admitted immediately as CONFIRMED or parked as PENDING.
    pub async fn add_request(
        &self,
        user_id: i64,
        event_id: i64,
    ) -> Result<ParticipationRequestView> {
        self.require_user(user_id).await?;

        let mut tx = self.db.begin().await?;
        let event = self
            .db
            .events
            .find_by_id_for_update(&mut tx, event_id)
            .await?
            .ok_or(AfishaError::EventNotFound { event_id })?;

        let has_active_request = self
            .db
            .requests
            .find_active_by_requester_and_event(&mut tx, user_id, event_id)
            .await?
            .is_some();

        let admission = admission::admit_single(&event, user_id, has_active_request)?;
        let request = self
            .db
            .requests
            .create(&mut tx, event_id, user_id, admission.initial_status)
            .await?;
        if admission.increments_confirmed {
            self.db
                .events
                .set_confirmed_requests(&mut tx, event_id, event.confirmed_requests + 1)
                .await?;
        }
        tx.commit().await?;

        info!(
            request_id = request.id,
            event_id = event_id,
            requester_id = user_id,
            status = request.status.as_str(),
            "Participation request created"
        );
        Ok(ParticipationRequestView::from(request))
    }

    /// Cancel one's own request
    pub async fn cancel_request(
        &self,
        user_id: i64,
        request_id: i64,
    ) -> Result<ParticipationRequestView> {
        self.require_user(user_id).await?;
        let request = self
            .db
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or(AfishaError::RequestNotFound { request_id })?;

        let new_status = admission::cancel_own_request(&request, user_id)?;
        debug_assert_eq!(new_status, RequestStatus::Canceled);
        let request = self.db.requests.update_status(request_id, new_status).await?;

        info!(
            request_id = request_id,
            requester_id = user_id,
            "Participation request canceled"
        );
        Ok(ParticipationRequestView::from(request))
    }

    /// All requests filed by one user across events
    pub async fn list_own(&self, user_id: i64) -> Result<Vec<ParticipationRequestView>> {
        self.require_user(user_id).await?;
        debug!(user_id = user_id, "Listing own participation requests");

        let requests = self.db.requests.find_by_requester(user_id).await?;
        Ok(requests
            .into_iter()
            .map(ParticipationRequestView::from)
            .collect())
    }

    async fn require_user(&self, user_id: i64) -> Result<()> {
        self.db
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AfishaError::UserNotFound { user_id })?;
        Ok(())
    }
}

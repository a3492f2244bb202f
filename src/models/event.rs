//! Event model
//!
//! An event is a user-published gathering moving through moderation
//! (PENDING) into PUBLISHED or CANCELED, with an optionally capacity-limited
//! join process.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::category::CategoryView;
use crate::models::user::UserShortView;
use crate::utils::datetime::{serde_format, serde_format_opt};
use crate::utils::errors::AfishaError;

/// Event moderation state
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum EventState {
    Pending,
    Published,
    Canceled,
}

impl EventState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            EventState::Pending => "PENDING",
            EventState::Published => "PUBLISHED",
            EventState::Canceled => "CANCELED",
        }
    }
}

impl FromStr for EventState {
    type Err = AfishaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(EventState::Pending),
            "PUBLISHED" => Ok(EventState::Published),
            "CANCELED" => Ok(EventState::Canceled),
            other => Err(AfishaError::InvalidInput(format!(
                "Unknown event state: {}",
                other
            ))),
        }
    }
}

/// Moderation action taken by an administrator on an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminAction {
    PublishEvent,
    RejectEvent,
}

/// Review action taken by the event's initiator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserAction {
    SendToReview,
    CancelReview,
}

/// Geographic coordinates of the venue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// Event row joined with category and initiator names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: i64,
    pub annotation: String,
    pub category_id: i64,
    pub category_name: String,
    pub confirmed_requests: i32,
    pub created_on: DateTime<Utc>,
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub initiator_id: i64,
    pub initiator_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub paid: bool,
    pub participant_limit: i32,
    pub published_on: Option<DateTime<Utc>>,
    pub request_moderation: bool,
    pub state: EventState,
    pub title: String,
    pub views: i64,
}

impl Event {
    pub fn location(&self) -> Location {
        Location {
            lat: self.latitude,
            lon: self.longitude,
        }
    }

    /// Whether at least one more participant can still be confirmed
    pub fn has_free_slots(&self) -> bool {
        self.participant_limit == 0 || self.confirmed_requests < self.participant_limit
    }
}

/// Payload for creating a new event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEventRequest {
    pub annotation: String,
    pub category: i64,
    pub description: String,
    #[serde(with = "serde_format")]
    pub event_date: DateTime<Utc>,
    pub location: Location,
    #[serde(default)]
    pub paid: bool,
    #[serde(default)]
    pub participant_limit: i32,
    #[serde(default = "default_request_moderation")]
    pub request_moderation: bool,
    pub title: String,
}

fn default_request_moderation() -> bool {
    true
}

/// Partial event update shared by the admin and initiator paths
///
/// Absent fields (and blank text fields) leave the stored value unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventFields {
    pub annotation: Option<String>,
    pub category: Option<i64>,
    pub description: Option<String>,
    #[serde(default, with = "serde_format_opt")]
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<Location>,
    pub paid: Option<bool>,
    pub participant_limit: Option<i32>,
    pub request_moderation: Option<bool>,
    pub title: Option<String>,
}

/// Admin event update: partial fields plus an optional moderation action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventAdminRequest {
    #[serde(flatten)]
    pub fields: UpdateEventFields,
    pub state_action: Option<AdminAction>,
}

/// Initiator event update: partial fields plus an optional review action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventUserRequest {
    #[serde(flatten)]
    pub fields: UpdateEventFields,
    pub state_action: Option<UserAction>,
}

/// Full event representation returned to admins, initiators and public detail
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventFullView {
    pub id: i64,
    pub annotation: String,
    pub category: CategoryView,
    pub confirmed_requests: i32,
    #[serde(with = "serde_format")]
    pub created_on: DateTime<Utc>,
    pub description: String,
    #[serde(with = "serde_format")]
    pub event_date: DateTime<Utc>,
    pub initiator: UserShortView,
    pub location: Location,
    pub paid: bool,
    pub participant_limit: i32,
    #[serde(default, with = "serde_format_opt")]
    pub published_on: Option<DateTime<Utc>>,
    pub request_moderation: bool,
    pub state: EventState,
    pub title: String,
    pub views: i64,
}

/// Short event representation used by listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventShortView {
    pub id: i64,
    pub annotation: String,
    pub category: CategoryView,
    pub confirmed_requests: i32,
    #[serde(with = "serde_format")]
    pub event_date: DateTime<Utc>,
    pub initiator: UserShortView,
    pub paid: bool,
    pub title: String,
    pub views: i64,
}

impl From<Event> for EventFullView {
    fn from(event: Event) -> Self {
        let location = event.location();
        Self {
            id: event.id,
            annotation: event.annotation,
            category: CategoryView {
                id: event.category_id,
                name: event.category_name,
            },
            confirmed_requests: event.confirmed_requests,
            created_on: event.created_on,
            description: event.description,
            event_date: event.event_date,
            initiator: UserShortView {
                id: event.initiator_id,
                name: event.initiator_name,
            },
            location,
            paid: event.paid,
            participant_limit: event.participant_limit,
            published_on: event.published_on,
            request_moderation: event.request_moderation,
            state: event.state,
            title: event.title,
            views: event.views,
        }
    }
}

impl From<Event> for EventShortView {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            annotation: event.annotation,
            category: CategoryView {
                id: event.category_id,
                name: event.category_name,
            },
            confirmed_requests: event.confirmed_requests,
            event_date: event.event_date,
            initiator: UserShortView {
                id: event.initiator_id,
                name: event.initiator_name,
            },
            paid: event.paid,
            title: event.title,
            views: event.views,
        }
    }
}

/// Sort order for the public event listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventSort {
    EventDate,
    Views,
}

impl FromStr for EventSort {
    type Err = AfishaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EVENT_DATE" => Ok(EventSort::EventDate),
            "VIEWS" => Ok(EventSort::Views),
            other => Err(AfishaError::InvalidInput(format!(
                "Unknown sort order: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    #[test]
    fn test_state_round_trip() {
        for state in [EventState::Pending, EventState::Published, EventState::Canceled] {
            assert_eq!(state.as_str().parse::<EventState>().unwrap(), state);
        }
        assert!("DRAFT".parse::<EventState>().is_err());
    }

    #[test]
    fn test_new_event_defaults() {
        let json = r#"{
            "annotation": "An evening of social dancing for beginners",
            "category": 3,
            "description": "Two hours of guided practice followed by an open floor session",
            "eventDate": "2035-06-15 19:00:00",
            "location": {"lat": 55.75, "lon": 37.62},
            "title": "Beginner social"
        }"#;
        let request: NewEventRequest = serde_json::from_str(json).unwrap();
        assert!(!request.paid);
        assert_eq!(request.participant_limit, 0);
        assert!(request.request_moderation);
    }

    #[test]
    fn test_update_action_parsing() {
        let admin: UpdateEventAdminRequest =
            serde_json::from_str(r#"{"stateAction": "PUBLISH_EVENT"}"#).unwrap();
        assert_eq!(admin.state_action, Some(AdminAction::PublishEvent));

        let user: UpdateEventUserRequest =
            serde_json::from_str(r#"{"stateAction": "CANCEL_REVIEW", "title": "New title"}"#)
                .unwrap();
        assert_eq!(user.state_action, Some(UserAction::CancelReview));
        assert_eq!(user.fields.title.as_deref(), Some("New title"));
    }

    #[test]
    fn test_has_free_slots() {
        let mut event = sample_event();
        event.participant_limit = 0;
        assert!(event.has_free_slots());
        event.participant_limit = 2;
        event.confirmed_requests = 2;
        assert!(!event.has_free_slots());
    }

    pub(crate) fn sample_event() -> Event {
        Event {
            id: 1,
            annotation: "Weekly swing social with live music".to_string(),
            category_id: 3,
            category_name: "Dance".to_string(),
            confirmed_requests: 0,
            created_on: Utc::now(),
            description: "Open-floor social dancing, all levels welcome".to_string(),
            event_date: Utc::now() + chrono::Duration::days(7),
            initiator_id: 10,
            initiator_name: "Alice".to_string(),
            latitude: 55.75,
            longitude: 37.62,
            paid: false,
            participant_limit: 0,
            published_on: None,
            request_moderation: true,
            state: EventState::Pending,
            title: "Swing social".to_string(),
            views: 0,
        }
    }
}

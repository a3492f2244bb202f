//! Event lifecycle rules
//!
//! The state machine moving an event between PENDING, PUBLISHED and
//! CANCELED, plus the lead-time and field-level validation shared by the
//! create and update paths. Invalid transitions are rejected here, in one
//! place, rather than at call sites.

use chrono::{DateTime, Duration, Utc};

use crate::config::LifecycleConfig;
use crate::models::category::Category;
use crate::models::event::{
    AdminAction, Event, EventState, NewEventRequest, UpdateEventFields, UserAction,
};
use crate::utils::errors::{AfishaError, Result};

/// Minimum distances between "now" and an event's start date
#[derive(Debug, Clone, Copy)]
pub struct LeadTimes {
    /// Required lead at creation and on any event-date change
    pub event_min_lead: Duration,
    /// Required lead at the moment of publication
    pub publish_min_lead: Duration,
}

impl LeadTimes {
    pub fn from_config(config: &LifecycleConfig) -> Self {
        Self {
            event_min_lead: Duration::hours(config.event_min_lead_hours),
            publish_min_lead: Duration::hours(config.publish_min_lead_hours),
        }
    }
}

impl Default for LeadTimes {
    fn default() -> Self {
        Self {
            event_min_lead: Duration::hours(2),
            publish_min_lead: Duration::hours(1),
        }
    }
}

/// Result of a state-machine step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub state: EventState,
    /// Set exactly once, at the PENDING -> PUBLISHED transition
    pub published_on: Option<DateTime<Utc>>,
}

/// Check the minimum-lead-time invariant for an event date
pub fn validate_event_date(
    event_date: DateTime<Utc>,
    now: DateTime<Utc>,
    min_lead: Duration,
) -> Result<()> {
    if event_date < now + min_lead {
        return Err(AfishaError::InvalidInput(format!(
            "Event date must be at least {} hours in the future",
            min_lead.num_hours()
        )));
    }
    Ok(())
}

/// Validate a new-event payload: text bounds, limit sign and lead time
pub fn validate_new_event(
    request: &NewEventRequest,
    now: DateTime<Utc>,
    lead_times: LeadTimes,
) -> Result<()> {
    validate_text_bounds("annotation", &request.annotation, 20, 2000)?;
    validate_text_bounds("description", &request.description, 20, 7000)?;
    validate_text_bounds("title", &request.title, 3, 120)?;
    if request.participant_limit < 0 {
        return Err(AfishaError::InvalidInput(
            "Participant limit must not be negative".to_string(),
        ));
    }
    validate_event_date(request.event_date, now, lead_times.event_min_lead)
}

/// Validate the bounded text fields present in a partial update
pub fn validate_update_fields(fields: &UpdateEventFields) -> Result<()> {
    if let Some(annotation) = fields.annotation.as_deref() {
        if !annotation.trim().is_empty() {
            validate_text_bounds("annotation", annotation, 20, 2000)?;
        }
    }
    if let Some(description) = fields.description.as_deref() {
        if !description.trim().is_empty() {
            validate_text_bounds("description", description, 20, 7000)?;
        }
    }
    if let Some(title) = fields.title.as_deref() {
        if !title.trim().is_empty() {
            validate_text_bounds("title", title, 3, 120)?;
        }
    }
    if let Some(limit) = fields.participant_limit {
        if limit < 0 {
            return Err(AfishaError::InvalidInput(
                "Participant limit must not be negative".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_text_bounds(field: &str, value: &str, min: usize, max: usize) -> Result<()> {
    let length = value.chars().count();
    if length < min || length > max {
        return Err(AfishaError::InvalidInput(format!(
            "Field '{}' must be between {} and {} characters, got {}",
            field, min, max, length
        )));
    }
    Ok(())
}

/// Apply an administrator's moderation action to an event
pub fn admin_transition(
    current: EventState,
    stored_event_date: DateTime<Utc>,
    action: AdminAction,
    now: DateTime<Utc>,
    lead_times: LeadTimes,
) -> Result<Transition> {
    match action {
        AdminAction::PublishEvent => {
            if current != EventState::Pending {
                return Err(AfishaError::Conflict(format!(
                    "Cannot publish an event in state {}",
                    current.as_str()
                )));
            }
            if stored_event_date < now + lead_times.publish_min_lead {
                return Err(AfishaError::Conflict(format!(
                    "Cannot publish less than {} hours before the event starts",
                    lead_times.publish_min_lead.num_hours()
                )));
            }
            Ok(Transition {
                state: EventState::Published,
                published_on: Some(now),
            })
        }
        AdminAction::RejectEvent => {
            if current == EventState::Published {
                return Err(AfishaError::Conflict(
                    "Cannot reject an already published event".to_string(),
                ));
            }
            Ok(Transition {
                state: EventState::Canceled,
                published_on: None,
            })
        }
    }
}

/// Apply an initiator's review action to an event
///
/// Callers must already have refused updates to published events; review
/// actions only move between PENDING and CANCELED.
pub fn user_transition(current: EventState, action: UserAction) -> Result<EventState> {
    if current == EventState::Published {
        return Err(AfishaError::Conflict(
            "Only pending or canceled events can be reviewed".to_string(),
        ));
    }
    match action {
        UserAction::SendToReview => Ok(EventState::Pending),
        UserAction::CancelReview => Ok(EventState::Canceled),
    }
}

/// Apply partial field updates to an event, reporting whether anything changed
///
/// Text fields are applied only when present and non-blank; `category` must
/// already be resolved by the caller (existence is a lookup concern).
/// The event date is handled separately because its validation depends on
/// the caller's clock.
pub fn apply_field_updates(
    event: &mut Event,
    fields: &UpdateEventFields,
    category: Option<Category>,
) -> bool {
    let mut changed = false;

    if let Some(annotation) = fields.annotation.as_deref() {
        if !annotation.trim().is_empty() && annotation != event.annotation {
            event.annotation = annotation.to_string();
            changed = true;
        }
    }
    if let Some(category) = category {
        if category.id != event.category_id {
            event.category_id = category.id;
            event.category_name = category.name;
            changed = true;
        }
    }
    if let Some(description) = fields.description.as_deref() {
        if !description.trim().is_empty() && description != event.description {
            event.description = description.to_string();
            changed = true;
        }
    }
    if let Some(location) = fields.location {
        if location.lat != event.latitude || location.lon != event.longitude {
            event.latitude = location.lat;
            event.longitude = location.lon;
            changed = true;
        }
    }
    if let Some(limit) = fields.participant_limit {
        if limit != event.participant_limit {
            event.participant_limit = limit;
            changed = true;
        }
    }
    if let Some(paid) = fields.paid {
        if paid != event.paid {
            event.paid = paid;
            changed = true;
        }
    }
    if let Some(moderation) = fields.request_moderation {
        if moderation != event.request_moderation {
            event.request_moderation = moderation;
            changed = true;
        }
    }
    if let Some(title) = fields.title.as_deref() {
        if !title.trim().is_empty() && title != event.title {
            event.title = title.to_string();
            changed = true;
        }
    }

    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::event::tests::sample_event;
    use assert_matches::assert_matches;

    fn leads() -> LeadTimes {
        LeadTimes::default()
    }

    #[test]
    fn test_publish_from_pending() {
        let now = Utc::now();
        let transition = admin_transition(
            EventState::Pending,
            now + Duration::hours(5),
            AdminAction::PublishEvent,
            now,
            leads(),
        )
        .unwrap();
        assert_eq!(transition.state, EventState::Published);
        assert_eq!(transition.published_on, Some(now));
    }

    #[test]
    fn test_publish_twice_rejected() {
        let now = Utc::now();
        let result = admin_transition(
            EventState::Published,
            now + Duration::hours(5),
            AdminAction::PublishEvent,
            now,
            leads(),
        );
        assert_matches!(result, Err(AfishaError::Conflict(_)));
    }

    #[test]
    fn test_publish_canceled_rejected() {
        let now = Utc::now();
        let result = admin_transition(
            EventState::Canceled,
            now + Duration::hours(5),
            AdminAction::PublishEvent,
            now,
            leads(),
        );
        assert_matches!(result, Err(AfishaError::Conflict(_)));
    }

    #[test]
    fn test_publish_inside_lead_window_rejected() {
        let now = Utc::now();
        // Valid at creation time does not imply valid at publication time
        let result = admin_transition(
            EventState::Pending,
            now + Duration::minutes(30),
            AdminAction::PublishEvent,
            now,
            leads(),
        );
        assert_matches!(result, Err(AfishaError::Conflict(_)));
    }

    #[test]
    fn test_reject_published_refused() {
        let now = Utc::now();
        let result = admin_transition(
            EventState::Published,
            now + Duration::hours(5),
            AdminAction::RejectEvent,
            now,
            leads(),
        );
        assert_matches!(result, Err(AfishaError::Conflict(_)));
    }

    #[test]
    fn test_reject_pending_cancels() {
        let now = Utc::now();
        let transition = admin_transition(
            EventState::Pending,
            now + Duration::hours(5),
            AdminAction::RejectEvent,
            now,
            leads(),
        )
        .unwrap();
        assert_eq!(transition.state, EventState::Canceled);
        assert_eq!(transition.published_on, None);
    }

    #[test]
    fn test_user_review_actions() {
        assert_eq!(
            user_transition(EventState::Canceled, UserAction::SendToReview).unwrap(),
            EventState::Pending
        );
        assert_eq!(
            user_transition(EventState::Pending, UserAction::CancelReview).unwrap(),
            EventState::Canceled
        );
        assert_matches!(
            user_transition(EventState::Published, UserAction::SendToReview),
            Err(AfishaError::Conflict(_))
        );
    }

    #[test]
    fn test_event_date_lead_validation() {
        let now = Utc::now();
        assert!(validate_event_date(now + Duration::hours(3), now, Duration::hours(2)).is_ok());
        assert_matches!(
            validate_event_date(now + Duration::minutes(119), now, Duration::hours(2)),
            Err(AfishaError::InvalidInput(_))
        );
    }

    #[test]
    fn test_title_only_update_reports_changed_exactly_when_different() {
        let mut event = sample_event();
        let old_title = event.title.clone();
        let snapshot = event.clone();

        let same = UpdateEventFields {
            title: Some(old_title.clone()),
            ..Default::default()
        };
        assert!(!apply_field_updates(&mut event, &same, None));

        let different = UpdateEventFields {
            title: Some("Completely new title".to_string()),
            ..Default::default()
        };
        assert!(apply_field_updates(&mut event, &different, None));
        assert_eq!(event.title, "Completely new title");

        // everything except the title is untouched
        assert_eq!(event.annotation, snapshot.annotation);
        assert_eq!(event.description, snapshot.description);
        assert_eq!(event.participant_limit, snapshot.participant_limit);
        assert_eq!(event.paid, snapshot.paid);
        assert_eq!(event.latitude, snapshot.latitude);
        assert_eq!(event.longitude, snapshot.longitude);
    }

    #[test]
    fn test_blank_text_fields_ignored() {
        let mut event = sample_event();
        let original = event.title.clone();
        let fields = UpdateEventFields {
            title: Some("   ".to_string()),
            annotation: Some(String::new()),
            ..Default::default()
        };
        assert!(!apply_field_updates(&mut event, &fields, None));
        assert_eq!(event.title, original);
    }

    #[test]
    fn test_empty_update_is_noop() {
        let mut event = sample_event();
        assert!(!apply_field_updates(
            &mut event,
            &UpdateEventFields::default(),
            None
        ));
    }

    #[test]
    fn test_new_event_text_bounds() {
        let now = Utc::now();
        let mut request = NewEventRequest {
            annotation: "A long enough annotation for validation".to_string(),
            category: 1,
            description: "A long enough description for validation".to_string(),
            event_date: now + Duration::days(3),
            location: crate::models::event::Location { lat: 0.0, lon: 0.0 },
            paid: false,
            participant_limit: 0,
            request_moderation: true,
            title: "Valid title".to_string(),
        };
        assert!(validate_new_event(&request, now, leads()).is_ok());

        request.title = "ab".to_string();
        assert_matches!(
            validate_new_event(&request, now, leads()),
            Err(AfishaError::InvalidInput(_))
        );

        request.title = "Valid title".to_string();
        request.participant_limit = -1;
        assert_matches!(
            validate_new_event(&request, now, leads()),
            Err(AfishaError::InvalidInput(_))
        );
    }
}

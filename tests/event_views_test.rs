//! Wire-format tests for event views and requests
//!
//! The boundary contract: camelCase field names, `yyyy-MM-dd HH:mm:ss`
//! timestamps, and caller-supplied fields surviving the model -> view
//! round trip untouched.

use chrono::{TimeZone, Utc};

use afisha::models::event::{Event, EventFullView, EventShortView, EventState, NewEventRequest};
use afisha::models::request::{ParticipationRequest, ParticipationRequestView, RequestStatus};

fn stored_event() -> Event {
    Event {
        id: 42,
        annotation: "A two-hour guided tour of the old city center".to_string(),
        category_id: 3,
        category_name: "Walking tours".to_string(),
        confirmed_requests: 5,
        created_on: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        description: "Meet at the fountain; comfortable shoes recommended".to_string(),
        event_date: Utc.with_ymd_and_hms(2024, 7, 1, 18, 0, 0).unwrap(),
        initiator_id: 10,
        initiator_name: "Alice".to_string(),
        latitude: 55.7522,
        longitude: 37.6156,
        paid: true,
        participant_limit: 20,
        published_on: Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap()),
        request_moderation: true,
        state: EventState::Published,
        title: "Old city walk".to_string(),
        views: 117,
    }
}

#[test]
fn full_view_preserves_caller_fields() {
    let event = stored_event();
    let view = EventFullView::from(event.clone());

    assert_eq!(view.id, event.id);
    assert_eq!(view.annotation, event.annotation);
    assert_eq!(view.category.id, event.category_id);
    assert_eq!(view.category.name, event.category_name);
    assert_eq!(view.description, event.description);
    assert_eq!(view.event_date, event.event_date);
    assert_eq!(view.initiator.id, event.initiator_id);
    assert_eq!(view.location.lat, event.latitude);
    assert_eq!(view.location.lon, event.longitude);
    assert_eq!(view.paid, event.paid);
    assert_eq!(view.participant_limit, event.participant_limit);
    assert_eq!(view.request_moderation, event.request_moderation);
    assert_eq!(view.title, event.title);
}

#[test]
fn full_view_serializes_boundary_dates() {
    let view = EventFullView::from(stored_event());
    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["eventDate"], "2024-07-01 18:00:00");
    assert_eq!(json["createdOn"], "2024-05-01 12:00:00");
    assert_eq!(json["publishedOn"], "2024-05-02 09:30:00");
    assert_eq!(json["state"], "PUBLISHED");
    assert_eq!(json["confirmedRequests"], 5);
    assert_eq!(json["participantLimit"], 20);
    assert_eq!(json["requestModeration"], true);
}

#[test]
fn short_view_drops_detail_fields() {
    let view = EventShortView::from(stored_event());
    let json = serde_json::to_value(&view).unwrap();

    assert_eq!(json["title"], "Old city walk");
    assert_eq!(json["views"], 117);
    assert!(json.get("description").is_none());
    assert!(json.get("publishedOn").is_none());
    assert!(json.get("participantLimit").is_none());
}

#[test]
fn full_view_round_trips_through_json() {
    let view = EventFullView::from(stored_event());
    let json = serde_json::to_string(&view).unwrap();
    let back: EventFullView = serde_json::from_str(&json).unwrap();

    assert_eq!(back.id, view.id);
    assert_eq!(back.event_date, view.event_date);
    assert_eq!(back.published_on, view.published_on);
    assert_eq!(back.state, view.state);
    assert_eq!(back.views, view.views);
}

#[test]
fn new_event_request_parses_boundary_payload() {
    let json = r#"{
        "annotation": "An open-air jazz concert in the central park",
        "category": 2,
        "description": "Three local bands, food trucks and a dance floor under the stars",
        "eventDate": "2035-08-20 19:30:00",
        "location": {"lat": 55.75, "lon": 37.62},
        "paid": true,
        "participantLimit": 150,
        "requestModeration": false,
        "title": "Jazz in the park"
    }"#;
    let request: NewEventRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.category, 2);
    assert_eq!(request.participant_limit, 150);
    assert!(!request.request_moderation);
    assert_eq!(
        request.event_date,
        Utc.with_ymd_and_hms(2035, 8, 20, 19, 30, 0).unwrap()
    );
}

#[test]
fn request_view_uses_boundary_names() {
    let request = ParticipationRequest {
        id: 7,
        event_id: 42,
        requester_id: 99,
        created: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        status: RequestStatus::Pending,
    };
    let json = serde_json::to_value(ParticipationRequestView::from(request)).unwrap();

    assert_eq!(json["event"], 42);
    assert_eq!(json["requester"], 99);
    assert_eq!(json["created"], "2024-06-01 10:00:00");
    assert_eq!(json["status"], "PENDING");
}

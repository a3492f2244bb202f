//! Participation request model
//!
//! A participation request is one user's ask to join an event. It is
//! admitted, rejected or canceled; CANCELED and REJECTED are terminal.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::datetime::serde_format;
use crate::utils::errors::AfishaError;

/// Participation request status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Confirmed,
    Rejected,
    Canceled,
}

impl RequestStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Confirmed => "CONFIRMED",
            RequestStatus::Rejected => "REJECTED",
            RequestStatus::Canceled => "CANCELED",
        }
    }

    /// Terminal statuses never change again for the same request
    pub const fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Rejected | RequestStatus::Canceled)
    }
}

impl FromStr for RequestStatus {
    type Err = AfishaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(RequestStatus::Pending),
            "CONFIRMED" => Ok(RequestStatus::Confirmed),
            "REJECTED" => Ok(RequestStatus::Rejected),
            "CANCELED" => Ok(RequestStatus::Canceled),
            other => Err(AfishaError::InvalidInput(format!(
                "Unknown request status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ParticipationRequest {
    pub id: i64,
    pub event_id: i64,
    pub requester_id: i64,
    pub created: DateTime<Utc>,
    pub status: RequestStatus,
}

/// Wire representation of a participation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRequestView {
    pub id: i64,
    pub event: i64,
    pub requester: i64,
    #[serde(with = "serde_format")]
    pub created: DateTime<Utc>,
    pub status: RequestStatus,
}

impl From<ParticipationRequest> for ParticipationRequestView {
    fn from(request: ParticipationRequest) -> Self {
        Self {
            id: request.id,
            event: request.event_id,
            requester: request.requester_id,
            created: request.created,
            status: request.status,
        }
    }
}

/// Organizer's batch decision over a set of pending requests
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatusUpdateRequest {
    pub request_ids: Vec<i64>,
    pub status: RequestStatus,
}

/// Outcome of a batch decision, restricted to the targeted ids
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestStatusUpdateResult {
    pub confirmed_requests: Vec<ParticipationRequestView>,
    pub rejected_requests: Vec<ParticipationRequestView>,
}

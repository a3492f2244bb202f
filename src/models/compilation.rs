//! Compilation model
//!
//! A compilation is a curated, optionally pinned set of events shown
//! together on the billboard front page.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::event::EventShortView;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Compilation {
    pub id: i64,
    pub title: String,
    pub pinned: bool,
}

/// Wire representation of a compilation with its member events
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilationView {
    pub id: i64,
    pub title: String,
    pub pinned: bool,
    pub events: Vec<EventShortView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCompilationRequest {
    pub title: String,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub events: Vec<i64>,
}

/// Partial compilation update; absent fields keep the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCompilationRequest {
    pub title: Option<String>,
    pub pinned: Option<bool>,
    pub events: Option<Vec<i64>>,
}

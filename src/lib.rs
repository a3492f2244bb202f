//! Afisha event billboard backend
//!
//! Library backend for an event billboard: users publish gatherings,
//! administrators moderate them, participants file capacity-controlled
//! join requests, and view counts are pulled from a separate statistics
//! service. HTTP routing is left to the embedding application.

pub mod config;
pub mod database;
pub mod domain;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{AfishaError, ErrorKind, Result};

// Re-export main components for easy access
pub use database::DatabaseService;
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}

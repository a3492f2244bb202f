//! Error handling for Afisha
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the Afisha application
#[derive(Error, Debug)]
pub enum AfishaError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Category not found: {category_id}")]
    CategoryNotFound { category_id: i64 },

    #[error("Participation request not found: {request_id}")]
    RequestNotFound { request_id: i64 },

    #[error("Compilation not found: {compilation_id}")]
    CompilationNotFound { compilation_id: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias for Afisha operations
pub type Result<T> = std::result::Result<T, AfishaError>;

/// Response category an error maps to at the API boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Validation,
    Internal,
}

impl AfishaError {
    /// Map the error onto its response category
    pub fn kind(&self) -> ErrorKind {
        match self {
            AfishaError::UserNotFound { .. }
            | AfishaError::EventNotFound { .. }
            | AfishaError::CategoryNotFound { .. }
            | AfishaError::RequestNotFound { .. }
            | AfishaError::CompilationNotFound { .. } => ErrorKind::NotFound,
            AfishaError::Conflict(_) => ErrorKind::Conflict,
            AfishaError::InvalidInput(_) => ErrorKind::Validation,
            AfishaError::Database(_)
            | AfishaError::Migration(_)
            | AfishaError::Config(_)
            | AfishaError::Http(_)
            | AfishaError::Serialization(_)
            | AfishaError::Io(_)
            | AfishaError::UrlParse(_) => ErrorKind::Internal,
        }
    }

    /// Check if the error is recoverable by retrying later
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AfishaError::Http(_) | AfishaError::Io(_))
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "NOT_FOUND"),
            ErrorKind::Conflict => write!(f, "CONFLICT"),
            ErrorKind::Validation => write!(f, "VALIDATION"),
            ErrorKind::Internal => write!(f, "INTERNAL"),
        }
    }
}

//! Utility modules
//!
//! This module contains error handling, logging and formatting utilities

pub mod datetime;
pub mod errors;
pub mod logging;

pub use errors::{AfishaError, ErrorKind, Result};

//! Services module
//!
//! This module contains business logic services

pub mod category;
pub mod compilation;
pub mod event;
pub mod request;
pub mod stats;
pub mod user;

// Re-export commonly used services
pub use category::CategoryService;
pub use compilation::CompilationService;
pub use event::{AdminSearchParams, EventService, PublicSearchParams};
pub use request::RequestService;
pub use stats::{StatsClient, ViewStats};
pub use user::UserService;

use crate::config::Settings;
use crate::database::DatabaseService;
use crate::utils::errors::{AfishaError, Result};

/// Largest page size a listing will serve
const MAX_PAGE_SIZE: i64 = 1000;

/// Validate pagination parameters and convert them to LIMIT/OFFSET
pub(crate) fn page_params(from: i64, size: i64) -> Result<(i64, i64)> {
    if from < 0 {
        return Err(AfishaError::InvalidInput(
            "Parameter 'from' must not be negative".to_string(),
        ));
    }
    if size <= 0 || size > MAX_PAGE_SIZE {
        return Err(AfishaError::InvalidInput(format!(
            "Parameter 'size' must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok((size, from))
}

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub event_service: EventService,
    pub request_service: RequestService,
    pub category_service: CategoryService,
    pub compilation_service: CompilationService,
    pub user_service: UserService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(db: DatabaseService, settings: &Settings) -> Result<Self> {
        let stats_client = StatsClient::new(settings)?;
        let event_service = EventService::new(db.clone(), stats_client, settings);
        let request_service = RequestService::new(db.clone());
        let category_service = CategoryService::new(db.clone());
        let compilation_service = CompilationService::new(db.clone());
        let user_service = UserService::new(db);

        Ok(Self {
            event_service,
            request_service,
            category_service,
            compilation_service,
            user_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_page_params() {
        assert_eq!(page_params(0, 10).unwrap(), (10, 0));
        assert_eq!(page_params(20, 10).unwrap(), (10, 20));
        assert_matches!(page_params(-1, 10), Err(AfishaError::InvalidInput(_)));
        assert_matches!(page_params(0, 0), Err(AfishaError::InvalidInput(_)));
        assert_matches!(page_params(0, 1001), Err(AfishaError::InvalidInput(_)));
    }
}

//! Configuration validation
//!
//! Sanity checks applied to loaded settings before the application starts.

use url::Url;

use crate::config::Settings;
use crate::utils::errors::AfishaError;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<(), AfishaError> {
    if settings.app.name.trim().is_empty() {
        return Err(AfishaError::Config(
            "app.name must not be empty".to_string(),
        ));
    }

    if !settings.database.url.starts_with("postgresql://")
        && !settings.database.url.starts_with("postgres://")
    {
        return Err(AfishaError::Config(
            "database.url must be a postgresql:// URL".to_string(),
        ));
    }
    if settings.database.max_connections == 0 {
        return Err(AfishaError::Config(
            "database.max_connections must be positive".to_string(),
        ));
    }
    if settings.database.min_connections > settings.database.max_connections {
        return Err(AfishaError::Config(
            "database.min_connections must not exceed max_connections".to_string(),
        ));
    }

    Url::parse(&settings.stats.base_url)
        .map_err(|e| AfishaError::Config(format!("stats.base_url is invalid: {}", e)))?;
    if settings.stats.timeout_seconds == 0 {
        return Err(AfishaError::Config(
            "stats.timeout_seconds must be positive".to_string(),
        ));
    }

    if settings.lifecycle.event_min_lead_hours < 0 || settings.lifecycle.publish_min_lead_hours < 0
    {
        return Err(AfishaError::Config(
            "lifecycle lead times must not be negative".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn test_bad_stats_url_rejected() {
        let mut settings = Settings::default();
        settings.stats.base_url = "not a url".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_inverted_pool_bounds_rejected() {
        let mut settings = Settings::default();
        settings.database.min_connections = 20;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn test_negative_lead_time_rejected() {
        let mut settings = Settings::default();
        settings.lifecycle.event_min_lead_hours = -1;
        assert!(validate_settings(&settings).is_err());
    }
}

//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub stats: StatsConfig,
    pub lifecycle: LifecycleConfig,
    pub logging: LoggingConfig,
}

/// Application identity configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Service name reported to the statistics service with every hit
    pub name: String,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Statistics service client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

/// Event lifecycle timing configuration
///
/// Lead times are the minimum distance between "now" and an event's start:
/// `event_min_lead_hours` applies at creation and on any date change,
/// `publish_min_lead_hours` applies at the moment of publication.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LifecycleConfig {
    pub event_min_lead_hours: i64,
    pub publish_min_lead_hours: i64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("AFISHA").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::AfishaError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppConfig {
                name: "afisha-main".to_string(),
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/afisha".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            stats: StatsConfig {
                base_url: "http://localhost:9090".to_string(),
                timeout_seconds: 5,
            },
            lifecycle: LifecycleConfig {
                event_min_lead_hours: 2,
                publish_min_lead_hours: 1,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/afisha".to_string(),
            },
        }
    }
}

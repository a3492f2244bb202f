//! Statistics service client
//!
//! HTTP client for the external view-counting service. Hit recording is
//! fire-and-forget; count lookups are bounded by the configured timeout so
//! a stats outage can degrade into "no view data" instead of failing the
//! event browsing path.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Settings;
use crate::utils::datetime::format_date_time;
use crate::utils::errors::{AfishaError, Result};

/// Hit record sent to the statistics service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitPayload {
    pub app: String,
    pub uri: String,
    pub ip: String,
    pub timestamp: String,
}

/// Aggregated hit count for one URI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewStats {
    pub app: String,
    pub uri: String,
    pub hits: i64,
}

#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
    base_url: String,
    app_name: String,
}

impl StatsClient {
    /// Create a new StatsClient instance
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.stats.timeout_seconds))
            .user_agent(format!("{}/0.1", settings.app.name))
            .build()
            .map_err(AfishaError::Http)?;

        Ok(Self {
            client,
            base_url: settings.stats.base_url.trim_end_matches('/').to_string(),
            app_name: settings.app.name.clone(),
        })
    }

    /// Record a page hit, swallowing any failure
    ///
    /// A stats outage must never block the caller's primary response, so
    /// errors are logged and dropped here.
    pub async fn record_hit(&self, uri: &str, ip: &str) {
        if let Err(e) = self.send_hit(uri, ip).await {
            warn!(uri = uri, error = %e, "Failed to record hit, continuing");
        }
    }

    async fn send_hit(&self, uri: &str, ip: &str) -> Result<()> {
        let payload = HitPayload {
            app: self.app_name.clone(),
            uri: uri.to_string(),
            ip: ip.to_string(),
            timestamp: format_date_time(Utc::now()),
        };

        let response = self
            .client
            .post(format!("{}/hit", self.base_url))
            .json(&payload)
            .send()
            .await?;

        response.error_for_status()?;
        debug!(uri = uri, "Hit recorded");
        Ok(())
    }

    /// Fetch aggregated hit counts for a set of URIs over a time window
    ///
    /// An empty `uris` slice means "all URIs in range".
    pub async fn fetch_stats(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        uris: &[String],
        unique: bool,
    ) -> Result<Vec<ViewStats>> {
        let mut query: Vec<(&str, String)> = vec![
            ("start", format_date_time(start)),
            ("end", format_date_time(end)),
            ("unique", unique.to_string()),
        ];
        if !uris.is_empty() {
            query.push(("uris", uris.join(",")));
        }

        let response = self
            .client
            .get(format!("{}/stats", self.base_url))
            .query(&query)
            .send()
            .await?
            .error_for_status()?;

        let stats: Vec<ViewStats> = response.json().await?;
        debug!(count = stats.len(), "Fetched view statistics");
        Ok(stats)
    }
}

/// Parse the numeric suffix of a per-event URI like `/events/42`
pub fn event_id_from_uri(uri: &str) -> Option<i64> {
    uri.rsplit('/').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_from_uri() {
        assert_eq!(event_id_from_uri("/events/42"), Some(42));
        assert_eq!(event_id_from_uri("/events/"), None);
        assert_eq!(event_id_from_uri("/events/abc"), None);
    }

    #[test]
    fn test_view_stats_deserialization() {
        let json = r#"[{"app": "afisha-main", "uri": "/events/7", "hits": 15}]"#;
        let stats: Vec<ViewStats> = serde_json::from_str(json).unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].hits, 15);
        assert_eq!(event_id_from_uri(&stats[0].uri), Some(7));
    }
}

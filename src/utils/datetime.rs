//! Boundary date-time formatting
//!
//! All date-time values exchanged with the outside world (query filters,
//! statistics service) use the `yyyy-MM-dd HH:mm:ss` format in UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::utils::errors::{AfishaError, Result};

pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format a timestamp for the wire
pub fn format_date_time(value: DateTime<Utc>) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

/// Parse a boundary timestamp, rejecting blank or malformed input
pub fn parse_date_time(value: &str) -> Result<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AfishaError::InvalidInput(
            "Date must not be blank".to_string(),
        ));
    }
    let naive = NaiveDateTime::parse_from_str(trimmed, DATE_TIME_FORMAT)
        .map_err(|e| AfishaError::InvalidInput(format!("Invalid date '{}': {}", trimmed, e)))?;
    Ok(DateTime::from_naive_utc_and_offset(naive, Utc))
}

/// Parse an optional range bound, then check the range is not inverted
pub fn parse_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    let start = start.map(parse_date_time).transpose()?;
    let end = end.map(parse_date_time).transpose()?;
    if let (Some(s), Some(e)) = (start, end) {
        if e < s {
            return Err(AfishaError::InvalidInput(
                "Range end must not be before range start".to_string(),
            ));
        }
    }
    Ok((start, end))
}

/// Serde adapter applying the boundary format to `DateTime<Utc>` fields
pub mod serde_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_TIME_FORMAT;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(DATE_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, DATE_TIME_FORMAT)
            .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
            .map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for optional boundary timestamps
pub mod serde_format_opt {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_TIME_FORMAT;

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(ts) => serializer.serialize_some(&ts.format(DATE_TIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            NaiveDateTime::parse_from_str(&s, DATE_TIME_FORMAT)
                .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

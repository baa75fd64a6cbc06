//! # Temporal Types — UTC Timestamps
//!
//! `Timestamp` wraps a `DateTime<Utc>`. The backend stamps notes with
//! `createdAt` in RFC 3339 with millisecond precision; the precision is kept
//! so that "newest first" ordering of uploads made within the same second
//! stays stable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::KithabError;

/// A UTC timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Wrap an existing `DateTime<Utc>`.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Parse an RFC 3339 string, accepting any offset and converting to UTC.
    ///
    /// # Errors
    ///
    /// Returns [`KithabError::InvalidTimestamp`] if the string is not RFC 3339.
    pub fn parse(s: &str) -> Result<Self, KithabError> {
        let dt = DateTime::parse_from_rfc3339(s.trim()).map_err(|e| {
            KithabError::InvalidTimestamp {
                value: s.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self(dt.with_timezone(&Utc)))
    }

    /// Create a timestamp from Unix epoch milliseconds.
    pub fn from_epoch_millis(millis: i64) -> Result<Self, KithabError> {
        let dt = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            KithabError::InvalidTimestamp {
                value: millis.to_string(),
                reason: "out of range".to_string(),
            }
        })?;
        Ok(Self(dt))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch milliseconds.
    pub fn epoch_millis(&self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Calendar date (`YYYY-MM-DD`), used in note listings.
    pub fn date_string(&self) -> String {
        self.0.format("%Y-%m-%d").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_millis() {
        let a = Timestamp::parse("2025-01-10T09:30:00.100Z").unwrap();
        let b = Timestamp::parse("2025-01-10T09:30:00.250Z").unwrap();
        assert!(a < b);
        assert_eq!(a.to_string(), "2025-01-10T09:30:00.100Z");
    }

    #[test]
    fn test_parse_converts_offset_to_utc() {
        let ts = Timestamp::parse("2025-01-10T15:00:00+05:30").unwrap();
        assert_eq!(ts.to_string(), "2025-01-10T09:30:00.000Z");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Timestamp::parse("yesterday").is_err());
    }

    #[test]
    fn test_date_string() {
        let ts = Timestamp::from_epoch_millis(0).unwrap();
        assert_eq!(ts.date_string(), "1970-01-01");
        assert_eq!(ts.epoch_millis(), 0);
    }
}

//! The version record written into the static asset directory.
//!
//! A [`VersionRecord`] is derived from a single clock reading: the raw
//! millisecond timestamp, its ISO-8601 rendering, and a prefixed version
//! string. Serialized field order is `timestamp`, `buildTime`, `version`.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::clock::Clock;

/// Largest timestamp whose ISO-8601 rendering keeps a four-digit year
/// (`9999-12-31T23:59:59.999Z`).
pub const MAX_TIMESTAMP_MS: i64 = 253_402_300_799_999;

/// Errors produced while building, encoding or reading back a record.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),

    #[error("failed to encode version record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode version record: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("inconsistent version record: {0}")]
    Inconsistent(String),
}

/// Build identity of one production build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VersionRecord {
    timestamp: i64,
    build_time: String,
    version: String,
}

impl VersionRecord {
    /// Build the record for the given instant.
    pub fn at(timestamp: i64, prefix: &str) -> Result<Self, RecordError> {
        if !(0..=MAX_TIMESTAMP_MS).contains(&timestamp) {
            return Err(RecordError::InvalidTimestamp(timestamp));
        }
        let instant = DateTime::<Utc>::from_timestamp_millis(timestamp)
            .ok_or(RecordError::InvalidTimestamp(timestamp))?;

        Ok(Self {
            timestamp,
            build_time: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            version: format!("{prefix}{timestamp}"),
        })
    }

    /// Build the record from a single reading of `clock`.
    pub fn now(clock: &dyn Clock, prefix: &str) -> Result<Self, RecordError> {
        Self::at(clock.now_millis(), prefix)
    }

    /// Parse a record and check that its fields agree with each other.
    pub fn from_json(s: &str, prefix: &str) -> Result<Self, RecordError> {
        let parsed: VersionRecord = serde_json::from_str(s).map_err(RecordError::Decode)?;
        let expected = Self::at(parsed.timestamp, prefix)?;

        if parsed.build_time != expected.build_time {
            return Err(RecordError::Inconsistent(format!(
                "buildTime {:?} does not match timestamp {} (expected {:?})",
                parsed.build_time, parsed.timestamp, expected.build_time
            )));
        }
        if parsed.version != expected.version {
            return Err(RecordError::Inconsistent(format!(
                "version {:?} does not match timestamp {} (expected {:?})",
                parsed.version, parsed.timestamp, expected.version
            )));
        }
        Ok(parsed)
    }

    /// Serialize the record, optionally indented with two spaces.
    pub fn to_json(&self, pretty: bool) -> Result<String, RecordError> {
        let rendered = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        rendered.map_err(RecordError::Encode)
    }

    /// Milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// ISO-8601 rendering of [`timestamp`](Self::timestamp).
    pub fn build_time(&self) -> &str {
        &self.build_time
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for VersionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.version, self.build_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use pretty_assertions::assert_eq;

    const NOV_2023: i64 = 1_700_000_000_000;

    #[test]
    fn test_record_fields() {
        let record = VersionRecord::at(NOV_2023, "v").unwrap();
        assert_eq!(record.timestamp(), NOV_2023);
        assert_eq!(record.build_time(), "2023-11-14T22:13:20.000Z");
        assert_eq!(record.version(), "v1700000000000");
    }

    #[test]
    fn test_record_from_clock() {
        let record = VersionRecord::now(&FixedClock(NOV_2023 + 42), "v").unwrap();
        assert_eq!(record.build_time(), "2023-11-14T22:13:20.042Z");
        assert_eq!(record.version(), "v1700000000042");
    }

    #[test]
    fn test_compact_json_layout() {
        let record = VersionRecord::at(NOV_2023, "v").unwrap();
        assert_eq!(
            record.to_json(false).unwrap(),
            r#"{"timestamp":1700000000000,"buildTime":"2023-11-14T22:13:20.000Z","version":"v1700000000000"}"#
        );
    }

    #[test]
    fn test_pretty_json_layout() {
        let record = VersionRecord::at(NOV_2023, "v").unwrap();
        let expected = "{\n  \"timestamp\": 1700000000000,\n  \"buildTime\": \"2023-11-14T22:13:20.000Z\",\n  \"version\": \"v1700000000000\"\n}";
        assert_eq!(record.to_json(true).unwrap(), expected);
    }

    #[test]
    fn test_epoch_and_upper_bound() {
        let epoch = VersionRecord::at(0, "v").unwrap();
        assert_eq!(epoch.build_time(), "1970-01-01T00:00:00.000Z");
        assert_eq!(epoch.version(), "v0");

        let last = VersionRecord::at(MAX_TIMESTAMP_MS, "v").unwrap();
        assert_eq!(last.build_time(), "9999-12-31T23:59:59.999Z");
    }

    #[test]
    fn test_rejects_out_of_range_timestamps() {
        assert!(matches!(
            VersionRecord::at(-1, "v"),
            Err(RecordError::InvalidTimestamp(-1))
        ));
        assert!(matches!(
            VersionRecord::at(MAX_TIMESTAMP_MS + 1, "v"),
            Err(RecordError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_custom_prefix() {
        let record = VersionRecord::at(NOV_2023, "build-").unwrap();
        assert_eq!(record.version(), "build-1700000000000");
    }

    #[test]
    fn test_from_json_accepts_own_output() {
        let record = VersionRecord::at(NOV_2023, "v").unwrap();
        let parsed = VersionRecord::from_json(&record.to_json(true).unwrap(), "v").unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn test_from_json_rejects_mismatched_build_time() {
        let json = r#"{"timestamp":1700000000000,"buildTime":"2023-11-14T22:13:21.000Z","version":"v1700000000000"}"#;
        assert!(matches!(
            VersionRecord::from_json(json, "v"),
            Err(RecordError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_mismatched_version() {
        let json = r#"{"timestamp":1700000000000,"buildTime":"2023-11-14T22:13:20.000Z","version":"v1700000000001"}"#;
        assert!(matches!(
            VersionRecord::from_json(json, "v"),
            Err(RecordError::Inconsistent(_))
        ));
    }

    #[test]
    fn test_from_json_rejects_wrong_shape() {
        let extra = r#"{"timestamp":0,"buildTime":"1970-01-01T00:00:00.000Z","version":"v0","hash":"x"}"#;
        let missing = r#"{"timestamp":0,"version":"v0"}"#;
        let float = r#"{"timestamp":1.5,"buildTime":"1970-01-01T00:00:00.001Z","version":"v1"}"#;
        for json in [extra, missing, float, "", "[]"] {
            assert!(
                matches!(
                    VersionRecord::from_json(json, "v"),
                    Err(RecordError::Decode(_))
                ),
                "accepted {json:?}"
            );
        }
    }

    #[test]
    fn test_display() {
        let record = VersionRecord::at(NOV_2023, "v").unwrap();
        assert_eq!(
            record.to_string(),
            "v1700000000000 (2023-11-14T22:13:20.000Z)"
        );
    }
}

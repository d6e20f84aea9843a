//! # Temporal Types: UTC-Only Timestamps
//!
//! `Timestamp` stamps ledger transitions and notifications. It is always
//! UTC, truncated to whole seconds, and renders as `YYYY-MM-DDTHH:MM:SSZ`.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// A UTC-only timestamp, truncated to seconds precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Render as ISO8601 with Z suffix (e.g., `2026-01-15T12:00:00Z`).
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(Timestamp::now().0.nanosecond(), 0);
    }

    #[test]
    fn truncates_subseconds() {
        let dt = Utc
            .with_ymd_and_hms(2018, 5, 1, 9, 30, 45)
            .unwrap()
            .with_nanosecond(987_654_321)
            .unwrap();
        let ts = Timestamp(truncate_to_seconds(dt));
        assert_eq!(ts.to_iso8601(), "2018-05-01T09:30:45Z");
        assert_eq!(ts.to_string(), ts.to_iso8601());
    }

    #[test]
    fn serde_round_trip() {
        let ts = Timestamp::now();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(serde_json::from_str::<Timestamp>(&json).unwrap(), ts);
    }
}

//! The cached statistics snapshot served by `GET /api/stats`.
//!
//! A snapshot is never persisted. It lives in the cache under
//! [`STATS_CACHE_KEY`] for [`DEFAULT_STATS_TTL`] and is recomputed from the
//! event store after expiry or invalidation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Cache key holding the serialized snapshot.
pub const STATS_CACHE_KEY: &str = "opsview:stats";

/// Lifetime of a cached snapshot.
pub const DEFAULT_STATS_TTL: Duration = Duration::from_secs(10);

/// Reported system status. No real health check backs this value.
pub const SYSTEM_STATUS_HEALTHY: &str = "Healthy";

/// Point-in-time statistics computed from the event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    /// Number of rows in the event log when the snapshot was computed.
    pub events_count: i64,
    pub system_status: String,
    /// When the count was taken.
    pub last_updated: Timestamp,
}

impl StatsSnapshot {
    /// Build a fresh snapshot from a row count taken at `now`.
    pub fn computed(events_count: i64, now: Timestamp) -> Self {
        Self {
            events_count: events_count.max(0),
            system_status: SYSTEM_STATUS_HEALTHY.to_string(),
            last_updated: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn computed_snapshot_is_always_healthy() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let snapshot = StatsSnapshot::computed(5, now);

        assert_eq!(snapshot.events_count, 5);
        assert_eq!(snapshot.system_status, "Healthy");
        assert_eq!(snapshot.last_updated, now);
    }

    #[test]
    fn negative_count_is_clamped_to_zero() {
        let snapshot = StatsSnapshot::computed(-3, Utc::now());
        assert_eq!(snapshot.events_count, 0);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_value(StatsSnapshot::computed(7, now)).unwrap();

        assert_eq!(json["eventsCount"], 7);
        assert_eq!(json["systemStatus"], "Healthy");
        assert_eq!(json["lastUpdated"], "2024-05-01T12:00:00Z");
        assert!(json.get("events_count").is_none());
    }

    #[test]
    fn cached_json_decodes_back_to_the_same_snapshot() {
        let raw = r#"{"eventsCount":5,"systemStatus":"Healthy","lastUpdated":"2024-05-01T12:00:00.123Z"}"#;
        let snapshot: StatsSnapshot = serde_json::from_str(raw).unwrap();

        assert_eq!(snapshot.events_count, 5);
        assert_eq!(snapshot.system_status, "Healthy");
    }
}

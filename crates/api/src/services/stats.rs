//! Cache-aside statistics over the event log.
//!
//! Reads check the cached snapshot first and recompute from the store on a
//! miss. Writes append to the store and then delete the cached snapshot, so
//! the next read recomputes. There is no locking: two concurrent misses may
//! both recompute and both write the cache, and a read racing an ingest can
//! still return the pre-ingest snapshot until the TTL runs out.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use opsview_cache::CacheStore;
use opsview_core::event::NewEvent;
use opsview_core::stats::{StatsSnapshot, STATS_CACHE_KEY};
use opsview_core::types::DbId;
use opsview_db::EventStore;

use crate::error::AppResult;
use crate::metrics::Metrics;

pub struct StatsService {
    store: Arc<dyn EventStore>,
    cache: Arc<dyn CacheStore>,
    metrics: Arc<Metrics>,
    ttl: Duration,
}

impl StatsService {
    pub fn new(
        store: Arc<dyn EventStore>,
        cache: Arc<dyn CacheStore>,
        metrics: Arc<Metrics>,
        ttl: Duration,
    ) -> Self {
        Self {
            store,
            cache,
            metrics,
            ttl,
        }
    }

    /// Name of the cache backend in use.
    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend()
    }

    /// Return the cached snapshot, or compute and cache a fresh one.
    ///
    /// Cache failures never fail the call: an unreadable cache or a corrupt
    /// cached value falls back to the store, and a failed cache write still
    /// returns the computed snapshot. Store failures propagate.
    pub async fn get_stats(&self) -> AppResult<StatsSnapshot> {
        if let Some(snapshot) = self.cached_snapshot().await {
            self.metrics.record_cache_hit();
            return Ok(snapshot);
        }
        self.metrics.record_cache_miss();

        let events_count = self.store.count_events().await?;
        let snapshot = StatsSnapshot::computed(events_count, Utc::now());

        match serde_json::to_string(&snapshot) {
            Ok(raw) => {
                if let Err(e) = self.cache.set_ex(STATS_CACHE_KEY, &raw, self.ttl).await {
                    tracing::warn!(
                        error = %e,
                        backend = self.cache.backend(),
                        "Failed to cache stats snapshot",
                    );
                }
            }
            Err(e) => tracing::warn!(error = %e, "Failed to serialize stats snapshot"),
        }

        tracing::debug!(events_count, "Stats snapshot recomputed");
        Ok(snapshot)
    }

    /// Append an event and invalidate the cached snapshot.
    ///
    /// A store failure returns before the cache is touched. A failed
    /// invalidation is reported as an error even though the row is
    /// committed, since a successful return promises the next read
    /// recomputes.
    pub async fn ingest_event(&self, event: &NewEvent) -> AppResult<DbId> {
        let id = self.store.insert_event(event).await?;
        self.cache.del(STATS_CACHE_KEY).await?;
        self.metrics.record_event_ingested();

        tracing::debug!(
            event_id = id,
            event_type = %event.event_type,
            "Event ingested, stats snapshot invalidated",
        );
        Ok(id)
    }

    async fn cached_snapshot(&self) -> Option<StatsSnapshot> {
        let raw = match self.cache.get(STATS_CACHE_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    backend = self.cache.backend(),
                    "Stats cache read failed, computing from store",
                );
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding undecodable cached stats snapshot");
                None
            }
        }
    }
}

//! Prometheus metrics owned by the service.
//!
//! [`Metrics`] holds its own [`Registry`] rather than using the crate-global
//! default one. It is built once in `main` and shared through
//! [`AppState`](crate::state::AppState).

use std::time::Duration;

use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, Registry, TextEncoder};

/// Bucket boundaries (seconds) for `http_request_duration_seconds`.
pub const HTTP_DURATION_BUCKETS: [f64; 9] = [0.1, 0.3, 0.5, 0.7, 1.0, 3.0, 5.0, 7.0, 10.0];

/// Content type of the text exposition format.
pub const CONTENT_TYPE: &str = prometheus::TEXT_FORMAT;

pub struct Metrics {
    registry: Registry,
    http_request_duration: HistogramVec,
    stats_cache_hits: IntCounter,
    stats_cache_misses: IntCounter,
    events_ingested: IntCounter,
}

impl Metrics {
    /// Create the registry and register every collector.
    ///
    /// On Linux the process collector (CPU, memory, file descriptors) is
    /// registered as well.
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let http_request_duration = HistogramVec::new(
            HistogramOpts::new(
                "http_request_duration_seconds",
                "Duration of HTTP requests in seconds",
            )
            .buckets(HTTP_DURATION_BUCKETS.to_vec()),
            &["method", "route", "code"],
        )?;
        let stats_cache_hits = IntCounter::new(
            "opsview_stats_cache_hits_total",
            "Stats requests served from the cached snapshot",
        )?;
        let stats_cache_misses = IntCounter::new(
            "opsview_stats_cache_misses_total",
            "Stats requests that recomputed the snapshot from the event store",
        )?;
        let events_ingested = IntCounter::new(
            "opsview_events_ingested_total",
            "Events appended to the event log",
        )?;

        registry.register(Box::new(http_request_duration.clone()))?;
        registry.register(Box::new(stats_cache_hits.clone()))?;
        registry.register(Box::new(stats_cache_misses.clone()))?;
        registry.register(Box::new(events_ingested.clone()))?;

        #[cfg(target_os = "linux")]
        registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(Self {
            registry,
            http_request_duration,
            stats_cache_hits,
            stats_cache_misses,
            events_ingested,
        })
    }

    pub fn observe_http_request(&self, method: &str, route: &str, status: u16, elapsed: Duration) {
        let code = status.to_string();
        self.http_request_duration
            .with_label_values(&[method, route, code.as_str()])
            .observe(elapsed.as_secs_f64());
    }

    pub fn record_cache_hit(&self) {
        self.stats_cache_hits.inc();
    }

    pub fn record_cache_miss(&self) {
        self.stats_cache_misses.inc();
    }

    pub fn record_event_ingested(&self) {
        self.events_ingested.inc();
    }

    pub fn cache_hits(&self) -> u64 {
        self.stats_cache_hits.get()
    }

    pub fn cache_misses(&self) -> u64 {
        self.stats_cache_misses.get()
    }

    pub fn events_ingested(&self) -> u64 {
        self.events_ingested.get()
    }

    /// Render every registered metric in the text exposition format.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_instances_do_not_collide() {
        // Each instance owns its registry, so duplicate names are fine.
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_cache_hit();

        assert_eq!(a.cache_hits(), 1);
        assert_eq!(b.cache_hits(), 0);
    }

    #[test]
    fn render_includes_histogram_with_labels_and_buckets() {
        let metrics = Metrics::new().unwrap();
        metrics.observe_http_request("GET", "/api/stats", 200, Duration::from_millis(40));

        let text = metrics.render().unwrap();
        assert!(text.contains("# TYPE http_request_duration_seconds histogram"));
        assert!(text.contains(
            r#"http_request_duration_seconds_bucket{code="200",method="GET",route="/api/stats",le="0.1"} 1"#
        ));
        assert!(text.contains(r#"le="10"} 1"#));
    }

    #[test]
    fn counters_are_rendered() {
        let metrics = Metrics::new().unwrap();
        metrics.record_cache_miss();
        metrics.record_event_ingested();
        metrics.record_event_ingested();

        let text = metrics.render().unwrap();
        assert!(text.contains("opsview_stats_cache_misses_total 1"));
        assert!(text.contains("opsview_events_ingested_total 2"));
        assert_eq!(metrics.events_ingested(), 2);
        assert_eq!(metrics.cache_misses(), 1);
    }
}

use std::sync::Arc;

use crate::metrics::Metrics;
use crate::services::StatsService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Cache-aside stats over the event store.
    pub stats: Arc<StatsService>,
    /// Prometheus registry and collectors.
    pub metrics: Arc<Metrics>,
}

pub mod health;
pub mod metrics;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /stats      GET   cached stats snapshot
/// /events     POST  ingest an event
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::stats::get_stats))
        .route("/events", post(handlers::events::ingest_event))
}

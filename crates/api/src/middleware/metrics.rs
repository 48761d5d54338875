//! Request-duration histogram middleware.

use std::time::Instant;

use axum::extract::{MatchedPath, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::state::AppState;

/// `route` label for requests that matched no route, so unknown paths do not
/// create new series.
pub const UNMATCHED_ROUTE: &str = "unmatched";

/// Observe `http_request_duration_seconds{method, route, code}` for every
/// request. `route` is the route template (e.g. `/api/stats`), not the raw
/// path.
pub async fn track_http_metrics(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_owned())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_owned());

    let response = next.run(request).await;

    state.metrics.observe_http_request(
        method.as_str(),
        &route,
        response.status().as_u16(),
        start.elapsed(),
    );
    response
}

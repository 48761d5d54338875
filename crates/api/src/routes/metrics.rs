use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::{routing::get, Router};

use crate::error::{AppError, AppResult};
use crate::metrics::CONTENT_TYPE;
use crate::state::AppState;

/// GET /metrics -- Prometheus text exposition.
async fn render_metrics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let body = state
        .metrics
        .render()
        .map_err(|e| AppError::InternalError(format!("failed to encode metrics: {e}")))?;

    Ok(([(header::CONTENT_TYPE, CONTENT_TYPE)], body))
}

/// Mount the scrape endpoint (root level, not under `/api`).
pub fn router() -> Router<AppState> {
    Router::new().route("/metrics", get(render_metrics))
}

use axum::extract::State;
use axum::Json;
use opsview_core::stats::StatsSnapshot;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /api/stats
///
/// Returns the current snapshot, at most one TTL stale.
pub async fn get_stats(State(state): State<AppState>) -> AppResult<Json<StatsSnapshot>> {
    let snapshot = state.stats.get_stats().await?;
    Ok(Json(snapshot))
}

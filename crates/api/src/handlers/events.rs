use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use opsview_core::event::NewEvent;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Body of `POST /api/events`.
///
/// Both fields are optional at the serde level so a missing field produces
/// a validation message instead of a generic JSON error.
#[derive(Debug, Deserialize)]
pub struct IngestEventRequest {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub payload: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct IngestEventResponse {
    pub message: &'static str,
}

/// POST /api/events
///
/// Validates the body, appends the event, and invalidates the cached stats.
pub async fn ingest_event(
    State(state): State<AppState>,
    body: Result<Json<IngestEventRequest>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = body.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;
    let event = NewEvent::from_parts(input.event_type, input.payload)?;

    let id = state.stats.ingest_event(&event).await?;

    tracing::info!(event_id = id, event_type = %event.event_type, "Event ingested");

    Ok((
        StatusCode::CREATED,
        Json(IngestEventResponse {
            message: "Event ingested",
        }),
    ))
}

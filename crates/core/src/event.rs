//! Validated input for event ingestion.
//!
//! Clients send `{ "type": ..., "payload": ... }`. Both fields are checked
//! here before anything reaches the store: the type must be a short
//! non-blank label and the payload must be structured JSON.

use serde::Serialize;
use serde_json::Value;
use validator::{Validate, ValidationError};

use crate::error::CoreError;

/// Maximum length of an event type label, after trimming.
pub const MAX_EVENT_TYPE_LEN: u64 = 100;

/// An event ready to be appended to the log.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct NewEvent {
    #[serde(rename = "type")]
    #[validate(
        length(
            min = 1,
            max = MAX_EVENT_TYPE_LEN,
            message = "type must be between 1 and 100 characters"
        ),
        custom(function = validate_type_text)
    )]
    pub event_type: String,
    #[validate(custom(function = validate_payload_shape))]
    pub payload: Value,
}

impl NewEvent {
    /// Build and validate an event from possibly-missing request fields.
    ///
    /// The type is trimmed before its length is checked.
    pub fn from_parts(event_type: Option<String>, payload: Option<Value>) -> Result<Self, CoreError> {
        let event_type = event_type
            .ok_or_else(|| CoreError::Validation("type is required".to_string()))?;
        let payload =
            payload.ok_or_else(|| CoreError::Validation("payload is required".to_string()))?;

        let event = Self {
            event_type: event_type.trim().to_string(),
            payload,
        };
        event
            .validate()
            .map_err(|errors| CoreError::Validation(errors.to_string()))?;
        Ok(event)
    }
}

/// PostgreSQL `TEXT` cannot hold NUL.
fn validate_type_text(event_type: &str) -> Result<(), ValidationError> {
    if event_type.contains('\0') {
        let mut err = ValidationError::new("type_nul");
        err.message = Some("type must not contain NUL characters".into());
        return Err(err);
    }
    Ok(())
}

/// Payloads must be a JSON object or array; scalars and `null` are rejected.
/// No key or string value may contain NUL, which `JSONB` refuses.
fn validate_payload_shape(payload: &Value) -> Result<(), ValidationError> {
    if !(payload.is_object() || payload.is_array()) {
        let mut err = ValidationError::new("payload_shape");
        err.message = Some("payload must be a JSON object or array".into());
        return Err(err);
    }
    if contains_nul(payload) {
        let mut err = ValidationError::new("payload_nul");
        err.message = Some("payload must not contain NUL characters".into());
        return Err(err);
    }
    Ok(())
}

fn contains_nul(value: &Value) -> bool {
    match value {
        Value::String(s) => s.contains('\0'),
        Value::Array(items) => items.iter().any(contains_nul),
        Value::Object(map) => map
            .iter()
            .any(|(key, value)| key.contains('\0') || contains_nul(value)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

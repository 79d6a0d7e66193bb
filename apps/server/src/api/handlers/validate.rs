//! The standalone validation endpoint.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderValue,
    response::Response,
};
use serde_json::Value;

use super::validation_response;
use crate::{error::Error, state::AppState, Result};

/// POST /validate — validate a single resource without forwarding.
///
/// Responds 200/400 with the OperationOutcome and annotates the response
/// with `X-Validation-Duration` and `X-Resource-Type`.
pub async fn validate_resource(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response> {
    let resource: Value = serde_json::from_slice(&body).map_err(|_| Error::InvalidJson)?;

    let result = state.validator.validate(&resource);
    if !result.valid {
        tracing::debug!(
            resource_type = result.resource_type,
            errors = result.errors.len(),
            "validation failed"
        );
    }

    let mut response = validation_response(&result);
    let headers = response.headers_mut();
    let duration_ms = format!("{:.3}ms", result.duration.as_secs_f64() * 1000.0);
    if let Ok(value) = HeaderValue::from_str(&duration_ms) {
        headers.insert("x-validation-duration", value);
    }
    if let Ok(value) = HeaderValue::from_str(&result.resource_type) {
        headers.insert("x-resource-type", value);
    }
    Ok(response)
}

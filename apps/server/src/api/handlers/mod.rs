//! Request handlers.

pub mod fhir;
pub mod system;
pub mod validate;

use axum::{http::StatusCode, response::Response};
use fhirgate_validator::ValidationResult;

use crate::api::fhir_json;

/// Render a validation result: 200 with the outcome when valid, 400 with
/// the outcome otherwise.
pub(crate) fn validation_response(result: &ValidationResult) -> Response {
    let status = if result.valid {
        StatusCode::OK
    } else {
        StatusCode::BAD_REQUEST
    };
    fhir_json(status, &result.outcome)
}

//! Error type shared by every handler.
//!
//! Every user-visible failure is rendered as the canonical OperationOutcome
//! document; the HTTP status classifies the failure but never replaces the
//! body.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use fhirgate_validator::operation_outcome;

use crate::api::FHIR_JSON;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Request too large")]
    PayloadTooLarge,

    #[error("Content-Type must be application/fhir+json")]
    UnsupportedMediaType,

    #[error("Invalid JSON")]
    InvalidJson,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("FHIR server not configured")]
    UpstreamUnavailable,

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Error::UnsupportedMediaType => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Error::InvalidJson | Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = operation_outcome("error", "invalid", &self.to_string());
        let mut response = (status, Json(body)).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(FHIR_JSON));
        response
    }
}

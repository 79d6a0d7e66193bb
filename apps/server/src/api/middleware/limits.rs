//! Request size enforcement.

use axum::{extract::Request, http::header, middleware::Next, response::Response};
use fhirgate_validator::MAX_REQUEST_SIZE;

use crate::{error::Error, Result};

/// Reject declared bodies over [`MAX_REQUEST_SIZE`] before reading them.
///
/// Chunked bodies without a declared length are bounded by the router's
/// body-limit layer instead.
pub async fn enforce_request_size(request: Request, next: Next) -> Result<Response> {
    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());

    if let Some(length) = declared {
        if length > MAX_REQUEST_SIZE {
            return Err(Error::PayloadTooLarge);
        }
    }

    Ok(next.run(request).await)
}

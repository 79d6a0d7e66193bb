//! HTTP surface: router assembly and shared response helpers.

pub mod handlers;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, StatusCode},
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use fhirgate_validator::{MAX_REQUEST_SIZE, MAX_VALIDATION_TIME_SECS};
use serde_json::Value;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;

/// Media type for every FHIR payload.
pub const FHIR_JSON: &str = "application/fhir+json";

/// Build the full application router.
pub fn create_router(state: AppState) -> Router {
    let fhir = Router::new()
        // System operations come before resource operations so the literal
        // segments win over `:resource_type`.
        .route("/", post(handlers::fhir::bundle_transaction))
        .route("/$process-message", post(handlers::fhir::process_message))
        .route("/metadata", get(handlers::fhir::capability_statement))
        .route(
            "/:resource_type",
            get(handlers::fhir::search).post(handlers::fhir::create),
        )
        .route(
            "/:resource_type/_search",
            get(handlers::fhir::search).post(handlers::fhir::search_via_post),
        )
        .route(
            "/:resource_type/:id",
            get(handlers::fhir::read)
                .put(handlers::fhir::update)
                .delete(handlers::fhir::delete),
        )
        .route("/:resource_type/:id/_history", get(handlers::fhir::history))
        .route(
            "/:resource_type/:id/_history/:vid",
            get(handlers::fhir::version_read),
        );

    Router::new()
        .route("/validate", post(handlers::validate::validate_resource))
        .nest("/fhir", fhir)
        .route("/health", get(handlers::system::health))
        .route("/metrics", get(handlers::system::metrics))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_bearer,
        ))
        .layer(axum_middleware::from_fn(
            middleware::limits::enforce_request_size,
        ))
        .layer(axum_middleware::from_fn(
            middleware::security::security_headers,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(MAX_VALIDATION_TIME_SECS)))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_SIZE))
        .with_state(state)
}

/// A JSON response carrying the FHIR media type.
pub(crate) fn fhir_json(status: StatusCode, body: &Value) -> Response {
    let mut response = (status, Json(body.clone())).into_response();
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(FHIR_JSON));
    response
}

//! FHIR R4 endpoints: validating writes, pure-proxy reads, and system
//! operations.
//!
//! Write operations (create, update, bundle, `$process-message`) are parsed
//! and validated before anything leaves the process; the raw request bytes
//! are what gets forwarded, so the upstream sees the payload unmodified.
//! Read operations bypass validation entirely. Without a configured
//! upstream the proxy degrades to validate-only behavior: writes are echoed
//! back, reads answer 503.

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::Response,
};
use chrono::Utc;
use fhirgate_validator::operation_outcome;
use serde_json::{json, Value};

use super::validation_response;
use crate::{
    api::{fhir_json, FHIR_JSON},
    error::Error,
    state::AppState,
    Result,
};

/// POST /fhir — validate a bundle and forward it.
pub async fn bundle_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    require_fhir_json(&headers)?;
    let bundle: Value = parse_body(&body)?;

    let result = state.validator.validate(&bundle);
    if !result.valid {
        return Ok(validation_response(&result));
    }

    match &state.upstream {
        Some(upstream) => upstream.forward(Method::POST, "", &headers, Some(body)).await,
        None => Ok(validation_response(&result)),
    }
}

/// POST /fhir/$process-message — FHIR messaging.
pub async fn process_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let message: Value = parse_body(&body)?;

    if message.get("resourceType").and_then(Value::as_str) != Some("Bundle") {
        return Err(Error::BadRequest("Message must be a Bundle".to_string()));
    }
    if message.get("type").and_then(Value::as_str) != Some("message") {
        return Err(Error::BadRequest("Bundle type must be 'message'".to_string()));
    }

    let result = state.validator.validate(&message);
    if !result.valid {
        return Ok(validation_response(&result));
    }

    match &state.upstream {
        Some(upstream) => {
            upstream
                .forward(Method::POST, "/$process-message", &headers, Some(body))
                .await
        }
        None => Ok(fhir_json(
            StatusCode::OK,
            &operation_outcome("information", "informational", "Message processed successfully"),
        )),
    }
}

/// GET /fhir/metadata — proxy the upstream CapabilityStatement or
/// synthesize one from the loaded profiles.
pub async fn capability_statement(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response> {
    if let Some(upstream) = &state.upstream {
        return upstream.forward(Method::GET, "/metadata", &headers, None).await;
    }

    let mut types = state.validator.profiles().resource_types();
    if types.is_empty() {
        types.push("Patient".to_string());
    }
    let resources: Vec<Value> = types
        .iter()
        .map(|resource_type| {
            json!({
                "type": resource_type,
                "interaction": [
                    {"code": "read"},
                    {"code": "create"},
                    {"code": "update"},
                    {"code": "delete"},
                    {"code": "search-type"}
                ]
            })
        })
        .collect();

    let capability = json!({
        "resourceType": "CapabilityStatement",
        "status": "active",
        "date": Utc::now().format("%Y-%m-%d").to_string(),
        "kind": "instance",
        "fhirVersion": "4.0.1",
        "format": [FHIR_JSON],
        "rest": [{"mode": "server", "resource": resources}]
    });
    Ok(fhir_json(StatusCode::OK, &capability))
}

/// POST /fhir/:resource_type — type-guarded create.
pub async fn create(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let mut resource: Value = parse_body(&body)?;

    let actual = resource
        .get("resourceType")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    if actual != resource_type {
        return Err(Error::BadRequest(format!(
            "Resource type mismatch: expected {resource_type}, got {actual}"
        )));
    }

    let result = state.validator.validate(&resource);
    if !result.valid {
        return Ok(validation_response(&result));
    }

    match &state.upstream {
        Some(upstream) => {
            upstream
                .forward(Method::POST, &format!("/{resource_type}"), &headers, Some(body))
                .await
        }
        None => {
            resource["id"] = json!(format!("generated-{}", Utc::now().timestamp()));
            Ok(fhir_json(StatusCode::CREATED, &resource))
        }
    }
}

/// PUT /fhir/:resource_type/:id — validating update.
pub async fn update(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response> {
    let mut resource: Value = parse_body(&body)?;

    let result = state.validator.validate(&resource);
    if !result.valid {
        return Ok(validation_response(&result));
    }

    match &state.upstream {
        Some(upstream) => {
            upstream
                .forward(
                    Method::PUT,
                    &format!("/{resource_type}/{id}"),
                    &headers,
                    Some(body),
                )
                .await
        }
        None => {
            resource["id"] = json!(id);
            Ok(fhir_json(StatusCode::OK, &resource))
        }
    }
}

/// GET /fhir/:resource_type/:id — pure proxy read.
pub async fn read(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response> {
    proxy(&state, Method::GET, format!("/{resource_type}/{id}"), &headers).await
}

/// DELETE /fhir/:resource_type/:id — pure proxy delete.
pub async fn delete(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response> {
    proxy(&state, Method::DELETE, format!("/{resource_type}/{id}"), &headers).await
}

/// GET /fhir/:resource_type — search passthrough.
pub async fn search(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Result<Response> {
    let mut target = format!("/{resource_type}");
    if let Some(query) = query {
        target.push('?');
        target.push_str(&query);
    }
    proxy(&state, Method::GET, target, &headers).await
}

/// POST /fhir/:resource_type/_search — search passthrough, POST flavor.
pub async fn search_via_post(
    state: State<AppState>,
    path: Path<String>,
    query: RawQuery,
    headers: HeaderMap,
) -> Result<Response> {
    search(state, path, query, headers).await
}

/// GET /fhir/:resource_type/:id/_history — pure proxy.
pub async fn history(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response> {
    proxy(
        &state,
        Method::GET,
        format!("/{resource_type}/{id}/_history"),
        &headers,
    )
    .await
}

/// GET /fhir/:resource_type/:id/_history/:vid — pure proxy.
pub async fn version_read(
    State(state): State<AppState>,
    Path((resource_type, id, vid)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Response> {
    proxy(
        &state,
        Method::GET,
        format!("/{resource_type}/{id}/_history/{vid}"),
        &headers,
    )
    .await
}

async fn proxy(
    state: &AppState,
    method: Method,
    path_and_query: String,
    headers: &HeaderMap,
) -> Result<Response> {
    let upstream = state.upstream.as_ref().ok_or(Error::UpstreamUnavailable)?;
    upstream.forward(method, &path_and_query, headers, None).await
}

fn parse_body(body: &Bytes) -> Result<Value> {
    serde_json::from_slice(body).map_err(|_| Error::InvalidJson)
}

fn require_fhir_json(headers: &HeaderMap) -> Result<()> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    if content_type.starts_with(FHIR_JSON) || content_type.contains("application/json") {
        Ok(())
    } else {
        Err(Error::UnsupportedMediaType)
    }
}

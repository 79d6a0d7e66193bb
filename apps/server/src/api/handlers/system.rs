//! Health and metrics endpoints.

use axum::{extract::State, Json};
use chrono::Utc;
use fhirgate_validator::MetricsSnapshot;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health — liveness for load balancers; degrades when the upstream
/// store stops answering its metadata endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let mut health = json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": "fhirgate",
        "version": env!("CARGO_PKG_VERSION"),
    });

    if let Some(upstream) = &state.upstream {
        if upstream.health().await {
            health["upstream"] = json!("healthy");
        } else {
            health["status"] = json!("degraded");
            health["upstream"] = json!("unavailable");
        }
    }

    Json(health)
}

/// GET /metrics — validation counters as JSON.
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.validator.metrics().snapshot())
}

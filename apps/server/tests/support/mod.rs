#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use fhirgate::{api::create_router, config::Config, state::AppState};
use fhirgate_validator::{RecipeBook, RuleTable, Validator};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const RULES_YAML: &str = r#"
Patient:
  address.postalCode:
    pattern: "^[A-Z]{1,2}[0-9R][0-9A-Z]? ?[0-9][A-Z]{2}$"
"#;

pub const RECIPES_YAML: &str = r#"
transaction:
  default:
    requiredResources:
      - resourceType: Patient
        minCount: 0
        maxCount: 5
      - resourceType: Provenance
        minCount: 1
message:
  default:
    requiredResources:
      - resourceType: MessageHeader
        minCount: 1
    messageValidation:
      - field: eventCoding
        required: true
      - field: source
        required: true
"#;

/// In-process application driven through `tower::ServiceExt::oneshot`.
pub struct TestApp {
    router: axum::Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let validator = Validator::builder()
            .rules(RuleTable::from_yaml(RULES_YAML).expect("test rules parse"))
            .recipes(RecipeBook::from_yaml(RECIPES_YAML).expect("test recipes parse"))
            .build();
        let state = AppState::from_parts(config, validator, None);
        Self {
            router: create_router(state),
        }
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> (StatusCode, HeaderMap, Bytes) {
        let bytes = body.map(|value| serde_json::to_vec(value).expect("serialize body"));
        self.request_raw(method, path, bytes, &[("content-type", "application/fhir+json")])
            .await
    }

    /// Raw request with full control over body bytes and headers.
    pub async fn request_raw(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
        headers: &[(&str, &str)],
    ) -> (StatusCode, HeaderMap, Bytes) {
        let mut builder = Request::builder().method(method).uri(path);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let body = match body {
            Some(bytes) => Body::from(bytes),
            None => Body::empty(),
        };
        let request = builder.body(body).expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router never fails");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read response body")
            .to_bytes();
        (status, headers, bytes)
    }
}

/// A Patient that satisfies every rule in [`RULES_YAML`].
pub fn valid_patient() -> Value {
    serde_json::json!({
        "resourceType": "Patient",
        "name": [{"family": "Smith"}],
        "address": [{"postalCode": "EC1A 1BB"}]
    })
}

/// A Patient that trips the postal-code pattern rule.
pub fn invalid_patient() -> Value {
    serde_json::json!({
        "resourceType": "Patient",
        "address": [{"postalCode": "INVALID"}]
    })
}

pub fn parse_json(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("response body is JSON")
}

pub fn diagnostics(outcome: &Value) -> Vec<String> {
    outcome["issue"]
        .as_array()
        .expect("outcome has issues")
        .iter()
        .map(|issue| issue["diagnostics"].as_str().unwrap_or_default().to_string())
        .collect()
}

pub fn assert_content_type(headers: &HeaderMap, expected: &str) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with(expected),
        "expected content-type {expected}, got {content_type}"
    );
}

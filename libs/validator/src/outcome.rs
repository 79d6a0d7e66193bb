//! OperationOutcome assembly and the validation result type.

use serde_json::{json, Value};
use std::time::Duration;

/// Result of one validation run.
///
/// `valid` always mirrors `errors.is_empty()`, and `outcome` always carries
/// at least one issue: an informational one on success, one error issue per
/// message otherwise.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub outcome: Value,
    pub duration: Duration,
    pub resource_type: String,
}

/// A single-issue OperationOutcome document.
pub fn operation_outcome(severity: &str, code: &str, diagnostics: &str) -> Value {
    json!({
        "resourceType": "OperationOutcome",
        "issue": [{
            "severity": severity,
            "code": code,
            "diagnostics": diagnostics,
        }]
    })
}

/// The canonical success outcome.
pub fn success_outcome() -> Value {
    operation_outcome("information", "informational", "Validation successful")
}

/// One error issue per message, generation order preserved.
pub fn error_outcome(errors: &[String]) -> Value {
    let issues: Vec<Value> = errors
        .iter()
        .map(|diagnostics| {
            json!({
                "severity": "error",
                "code": "invalid",
                "diagnostics": diagnostics,
            })
        })
        .collect();
    json!({
        "resourceType": "OperationOutcome",
        "issue": issues,
    })
}

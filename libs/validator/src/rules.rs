//! Field-level validation rules, loaded from `rules.yaml`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::path;

/// A single field rule, keyed by path suffix under a resource type.
///
/// All constraints are optional; `must_support` is informational only and
/// never produces a finding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldRule {
    pub min: u32,
    pub max: u32,
    pub fixed_value: Option<Value>,
    pub allowed_values: Vec<Value>,
    pub pattern: String,
    pub must_support: bool,
}

/// Per-resource-type rule tables: `resourceType → pathSuffix → FieldRule`.
///
/// Built once from YAML and immutable afterwards; shared by reference.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: HashMap<String, HashMap<String, FieldRule>>,
}

impl RuleTable {
    pub fn from_yaml(input: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(input)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Apply every rule registered for `resource_type` to the document,
    /// returning one message per failed constraint.
    ///
    /// Constraints are checked in a fixed order per rule (min, max, fixed,
    /// allowed, pattern); rule iteration order across paths is unspecified.
    /// A resource type without a table yields no findings.
    pub fn apply(&self, resource_type: &str, resource: &Value) -> Vec<String> {
        let mut errors = Vec::new();
        let Some(rules) = self.rules.get(resource_type) else {
            return errors;
        };

        for (suffix, rule) in rules {
            let full_path = format!("{resource_type}.{suffix}");

            if rule.min > 0 && !path::exists(resource, &full_path) {
                errors.push(format!("Missing required field (min): {suffix}"));
            }
            if rule.max > 0 && path::count(resource, &full_path) > rule.max as usize {
                errors.push(format!(
                    "Too many instances of field (max {}): {suffix}",
                    rule.max
                ));
            }
            if let Some(expected) = &rule.fixed_value {
                if !path::has_fixed(resource, &full_path, expected) {
                    errors.push(format!(
                        "Field {suffix} does not have fixed value {}",
                        display_value(expected)
                    ));
                }
            }
            if !rule.allowed_values.is_empty()
                && !path::has_allowed(resource, &full_path, &rule.allowed_values)
            {
                errors.push(format!("Field {suffix} has disallowed value"));
            }
            if !rule.pattern.is_empty() && !path::matches(resource, &full_path, &rule.pattern) {
                errors.push(format!(
                    "Field {suffix} does not match pattern {}",
                    rule.pattern
                ));
            }
        }

        errors
    }
}

/// Render a rule value for diagnostics: strings bare, everything else as
/// compact JSON.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RULES_YAML: &str = r#"
Patient:
  name:
    min: 1
    max: 3
  gender:
    allowedValues: ["male", "female", "other", "unknown"]
  address.postalCode:
    pattern: "^[A-Z]{1,2}[0-9R][0-9A-Z]? ?[0-9][A-Z]{2}$"
Observation:
  status:
    fixedValue: final
"#;

    fn table() -> RuleTable {
        RuleTable::from_yaml(RULES_YAML).unwrap()
    }

    #[test]
    fn parses_yaml_tables() {
        let t = table();
        let mut types: Vec<_> = t.resource_types().collect();
        types.sort();
        assert_eq!(types, ["Observation", "Patient"]);
    }

    #[test]
    fn no_table_means_no_findings() {
        let errors = table().apply("Encounter", &json!({"resourceType": "Encounter"}));
        assert!(errors.is_empty());
    }

    #[test]
    fn min_rule_reports_missing_field() {
        let errors = table().apply("Patient", &json!({"resourceType": "Patient"}));
        assert!(errors.contains(&"Missing required field (min): name".to_string()));
    }

    #[test]
    fn max_rule_reports_excess() {
        let resource = json!({
            "resourceType": "Patient",
            "name": [{"family": "A"}, {"family": "B"}, {"family": "C"}, {"family": "D"}]
        });
        let errors = table().apply("Patient", &resource);
        assert!(errors.contains(&"Too many instances of field (max 3): name".to_string()));
    }

    #[test]
    fn fixed_value_message_renders_string_bare() {
        let errors = table().apply(
            "Observation",
            &json!({"resourceType": "Observation", "status": "preliminary"}),
        );
        assert_eq!(
            errors,
            vec!["Field status does not have fixed value final".to_string()]
        );
    }

    #[test]
    fn allowed_values_rejects_outsider() {
        let resource = json!({
            "resourceType": "Patient",
            "name": [{"family": "A"}],
            "gender": "none"
        });
        let errors = table().apply("Patient", &resource);
        assert!(errors.contains(&"Field gender has disallowed value".to_string()));
    }

    #[test]
    fn pattern_rule_reports_mismatch() {
        let resource = json!({
            "resourceType": "Patient",
            "name": [{"family": "A"}],
            "address": [{"postalCode": "INVALID"}]
        });
        let errors = table().apply("Patient", &resource);
        assert!(errors
            .iter()
            .any(|e| e.starts_with("Field address.postalCode does not match pattern")));
    }

    #[test]
    fn clean_resource_passes_every_rule() {
        let resource = json!({
            "resourceType": "Patient",
            "name": [{"family": "Everyman"}],
            "gender": "female",
            "address": [{"postalCode": "EC1A 1BB"}]
        });
        assert!(table().apply("Patient", &resource).is_empty());
    }
}

//! The validation front door: classify the resource, run the rule layers,
//! assemble the outcome, update metrics.

use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::bundle::{validate_message_bundle, validate_transaction_bundle};
use crate::metrics::ValidationMetrics;
use crate::outcome::{error_outcome, success_outcome, ValidationResult};
use crate::profiles::ProfileStore;
use crate::recipes::RecipeBook;
use crate::rules::RuleTable;
use crate::MAX_BUNDLE_ENTRIES;

/// Reusable validator owning the loaded rule tables.
///
/// Construction happens once at startup (or via [`ValidatorBuilder`] in
/// tests); `validate` is then safe to call from any number of threads.
pub struct Validator {
    rules: Arc<RuleTable>,
    recipes: Arc<RecipeBook>,
    profiles: Arc<ProfileStore>,
    metrics: Arc<ValidationMetrics>,
}

impl Validator {
    pub fn new(
        rules: Arc<RuleTable>,
        recipes: Arc<RecipeBook>,
        profiles: Arc<ProfileStore>,
    ) -> Self {
        Self {
            rules,
            recipes,
            profiles,
            metrics: Arc::new(ValidationMetrics::new()),
        }
    }

    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::default()
    }

    pub fn metrics(&self) -> &Arc<ValidationMetrics> {
        &self.metrics
    }

    pub fn profiles(&self) -> &Arc<ProfileStore> {
        &self.profiles
    }

    /// Validate one resource document.
    ///
    /// Never mutates the input and never fails: every finding is collected
    /// into the result's error list. Metrics are updated on every exit.
    pub fn validate(&self, resource: &Value) -> ValidationResult {
        let start = Instant::now();

        if let Some(message) = oversized_bundle(resource) {
            let duration = start.elapsed();
            self.metrics.record_invalid();
            self.metrics.record_request();
            return ValidationResult {
                valid: false,
                outcome: error_outcome(std::slice::from_ref(&message)),
                errors: vec![message],
                duration,
                resource_type: resource_type_of(resource),
            };
        }

        let resource_type = resource.get("resourceType").and_then(Value::as_str);

        let mut errors = match resource_type {
            Some(rt) => self.rules.apply(rt, resource),
            None => vec!["Resource must have a 'resourceType' field".to_string()],
        };

        if resource_type == Some("Bundle") {
            match resource.get("type").and_then(Value::as_str) {
                Some("transaction") => {
                    errors.extend(validate_transaction_bundle(resource, &self.recipes));
                }
                Some("message") => {
                    errors.extend(validate_message_bundle(resource, &self.recipes));
                }
                _ => {}
            }
        }

        let valid = errors.is_empty();
        let duration = start.elapsed();

        if valid {
            self.metrics.record_valid();
        } else {
            self.metrics.record_invalid();
        }
        self.metrics.record_duration(duration);
        self.metrics.record_request();

        let outcome = if valid {
            success_outcome()
        } else {
            error_outcome(&errors)
        };

        ValidationResult {
            valid,
            errors,
            outcome,
            duration,
            resource_type: resource_type
                .map(str::to_string)
                .unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Resource-limit gate: bundles above [`MAX_BUNDLE_ENTRIES`] are rejected
/// before any rule runs.
fn oversized_bundle(resource: &Value) -> Option<String> {
    if resource.get("resourceType").and_then(Value::as_str) != Some("Bundle") {
        return None;
    }
    let entries = resource.get("entry").and_then(Value::as_array)?;
    if entries.len() > MAX_BUNDLE_ENTRIES {
        return Some(format!(
            "bundle contains too many entries: {} (max: {})",
            entries.len(),
            MAX_BUNDLE_ENTRIES
        ));
    }
    None
}

fn resource_type_of(resource: &Value) -> String {
    resource
        .get("resourceType")
        .and_then(Value::as_str)
        .unwrap_or("Unknown")
        .to_string()
}

/// Builds validators from in-memory tables; all tables default to empty.
#[derive(Default)]
pub struct ValidatorBuilder {
    rules: Option<Arc<RuleTable>>,
    recipes: Option<Arc<RecipeBook>>,
    profiles: Option<Arc<ProfileStore>>,
}

impl ValidatorBuilder {
    pub fn rules(mut self, rules: RuleTable) -> Self {
        self.rules = Some(Arc::new(rules));
        self
    }

    pub fn shared_rules(mut self, rules: Arc<RuleTable>) -> Self {
        self.rules = Some(rules);
        self
    }

    pub fn recipes(mut self, recipes: RecipeBook) -> Self {
        self.recipes = Some(Arc::new(recipes));
        self
    }

    pub fn shared_recipes(mut self, recipes: Arc<RecipeBook>) -> Self {
        self.recipes = Some(recipes);
        self
    }

    pub fn profiles(mut self, profiles: ProfileStore) -> Self {
        self.profiles = Some(Arc::new(profiles));
        self
    }

    pub fn shared_profiles(mut self, profiles: Arc<ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn build(self) -> Validator {
        Validator::new(
            self.rules.unwrap_or_default(),
            self.recipes.unwrap_or_default(),
            self.profiles.unwrap_or_default(),
        )
    }
}

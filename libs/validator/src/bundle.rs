//! Bundle-level validation: recipe enforcement and cross-reference
//! integrity for transaction and message bundles.

use serde_json::Value;
use std::collections::{HashMap, HashSet};

use crate::recipes::{Recipe, RecipeBook};

/// Validate a `Bundle` of type `transaction`.
///
/// Checks, in order: the `entry` array itself, the mandatory Provenance
/// entry, the `transaction:default` recipe (population bounds, forbidden
/// types, required references), and finally cross-reference integrity
/// across all entries.
pub fn validate_transaction_bundle(bundle: &Value, recipes: &RecipeBook) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(entries) = bundle.get("entry").and_then(Value::as_array) else {
        return vec!["Invalid or missing bundle entries".to_string()];
    };

    if !entries.iter().any(|e| entry_is_type(e, "Provenance")) {
        errors.push("Missing required Provenance resource in transaction".to_string());
    }

    if let Some(recipe) = recipes.get("transaction:default") {
        apply_recipe(recipe, entries, "", &mut errors);
    }

    // Reference integrity is independent of any recipe: every reference in
    // the bundle must point at an entry present in the bundle.
    let seen = local_identities(entries);
    for reference in all_references(entries) {
        if !seen.contains(&reference) {
            errors.push(format!("Unresolved reference: {reference}"));
        }
    }

    errors
}

/// Validate a `Bundle` of type `message`.
///
/// Same frame as [`validate_transaction_bundle`] with message semantics:
/// the mandatory entry is a MessageHeader, the recipe key is
/// `message:default`, population and reference wording carry an
/// ` in message` suffix, each MessageHeader is checked against the recipe's
/// per-header field rules, and cross-reference integrity is not applied
/// (messages routinely reference state outside the bundle).
pub fn validate_message_bundle(bundle: &Value, recipes: &RecipeBook) -> Vec<String> {
    let mut errors = Vec::new();

    let Some(entries) = bundle.get("entry").and_then(Value::as_array) else {
        return vec!["Invalid or missing bundle entries".to_string()];
    };

    if !entries.iter().any(|e| entry_is_type(e, "MessageHeader")) {
        errors.push("Missing required MessageHeader resource in message bundle".to_string());
    }

    if let Some(recipe) = recipes.get("message:default") {
        apply_recipe(recipe, entries, " in message", &mut errors);

        for entry in entries {
            let Some(resource) = entry_resource(entry) else {
                continue;
            };
            if resource_type_of(resource) != Some("MessageHeader") {
                continue;
            }
            for rule in &recipe.message_validation {
                if rule.required && resource.get(&rule.field).is_none() {
                    errors.push(format!(
                        "Missing required MessageHeader field: {}",
                        rule.field
                    ));
                }
            }
        }
    }

    errors
}

/// Population bounds, forbidden types, and must-reference checks shared by
/// both bundle kinds. `suffix` is appended to the population and reference
/// wordings (empty for transactions, ` in message` for messages).
fn apply_recipe(recipe: &Recipe, entries: &[Value], suffix: &str, errors: &mut Vec<String>) {
    let counts = resource_counts(entries);

    for required in &recipe.required_resources {
        let count = counts
            .get(required.resource_type.as_str())
            .copied()
            .unwrap_or(0);
        let min = required.effective_min();

        if count < min as usize {
            errors.push(format!(
                "Insufficient {} resources{}: found {}, minimum {} required",
                required.resource_type, suffix, count, min
            ));
        }
        if required.max_count > 0 && count > required.max_count as usize {
            errors.push(format!(
                "Too many {} resources{}: found {}, maximum {} allowed",
                required.resource_type, suffix, count, required.max_count
            ));
        }
    }

    for forbidden in &recipe.forbidden_resources {
        if counts.get(forbidden.as_str()).copied().unwrap_or(0) > 0 {
            errors.push(format!("Forbidden resource type in bundle: {forbidden}"));
        }
    }

    for rule in &recipe.must_reference {
        let prefix = format!("{}/", rule.target);
        let satisfied = entries
            .iter()
            .filter_map(entry_resource)
            .filter(|r| resource_type_of(r) == Some(rule.source.as_str()))
            .flat_map(collect_references)
            .any(|reference| reference.starts_with(&prefix));
        if !satisfied {
            errors.push(format!(
                "No {} -> {} reference found{}",
                rule.source, rule.target, suffix
            ));
        }
    }
}

/// Depth-first walk collecting every string held by an object member whose
/// key is exactly `reference`. Non-string `reference` values are skipped
/// without descending into them.
pub fn collect_references(resource: &Value) -> Vec<String> {
    let mut refs = Vec::new();
    collect_into(resource, &mut refs);
    refs
}

fn collect_into(value: &Value, refs: &mut Vec<String>) {
    match value {
        Value::Object(obj) => {
            for (key, member) in obj {
                if key == "reference" {
                    if let Some(s) = member.as_str() {
                        refs.push(s.to_string());
                    }
                } else {
                    collect_into(member, refs);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_into(item, refs);
            }
        }
        _ => {}
    }
}

fn entry_resource(entry: &Value) -> Option<&Value> {
    entry.get("resource").filter(|r| r.is_object())
}

fn resource_type_of(resource: &Value) -> Option<&str> {
    resource.get("resourceType").and_then(Value::as_str)
}

fn entry_is_type(entry: &Value, resource_type: &str) -> bool {
    entry_resource(entry)
        .and_then(resource_type_of)
        .map(|rt| rt == resource_type)
        .unwrap_or(false)
}

fn resource_counts<'a>(entries: &'a [Value]) -> HashMap<&'a str, usize> {
    let mut counts = HashMap::new();
    for entry in entries {
        if let Some(rt) = entry_resource(entry).and_then(resource_type_of) {
            *counts.entry(rt).or_insert(0) += 1;
        }
    }
    counts
}

/// `<resourceType>/<id>` identities of every entry that carries both fields
/// as strings; entries without them simply contribute nothing.
fn local_identities(entries: &[Value]) -> HashSet<String> {
    let mut seen = HashSet::new();
    for entry in entries {
        let Some(resource) = entry_resource(entry) else {
            continue;
        };
        if let (Some(rt), Some(id)) = (
            resource_type_of(resource),
            resource.get("id").and_then(Value::as_str),
        ) {
            seen.insert(format!("{rt}/{id}"));
        }
    }
    seen
}

fn all_references(entries: &[Value]) -> Vec<String> {
    entries
        .iter()
        .filter_map(entry_resource)
        .flat_map(collect_references)
        .collect()
}

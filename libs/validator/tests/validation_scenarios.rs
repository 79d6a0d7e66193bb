//! End-to-end validation scenarios against a builder-constructed validator.

use fhirgate_validator::{
    collect_references, RecipeBook, RuleTable, Validator, MAX_BUNDLE_ENTRIES,
};
use serde_json::{json, Value};

const RULES_YAML: &str = r#"
Patient:
  address.postalCode:
    pattern: "^[A-Z]{1,2}[0-9R][0-9A-Z]? ?[0-9][A-Z]{2}$"
"#;

const RECIPES_YAML: &str = r#"
transaction:
  default:
    requiredResources:
      - resourceType: Patient
        minCount: 0
        maxCount: 5
      - resourceType: Provenance
        minCount: 1
    forbiddenResources: [Organization]
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
      - field: focus
        required: true
"#;

fn validator_with_tables() -> Validator {
    Validator::builder()
        .rules(RuleTable::from_yaml(RULES_YAML).unwrap())
        .recipes(RecipeBook::from_yaml(RECIPES_YAML).unwrap())
        .build()
}

fn patient_entry(id: &str) -> Value {
    json!({"resource": {"resourceType": "Patient", "id": id}})
}

fn transaction(entries: Vec<Value>) -> Value {
    json!({"resourceType": "Bundle", "type": "transaction", "entry": entries})
}

#[test]
fn minimal_valid_patient_yields_informational_outcome() {
    let validator = Validator::builder().build();
    let result = validator.validate(&json!({
        "resourceType": "Patient",
        "name": [{"family": "Smith"}]
    }));

    assert!(result.valid);
    let issues = result.outcome["issue"].as_array().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0]["severity"], "information");
    assert_eq!(issues[0]["diagnostics"], "Validation successful");
}

#[test]
fn postal_code_pattern_mismatch_is_the_single_error() {
    let validator = validator_with_tables();
    let result = validator.validate(&json!({
        "resourceType": "Patient",
        "address": [{"postalCode": "INVALID"}]
    }));

    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Field address.postalCode does not match pattern"));
    assert_eq!(result.outcome["issue"][0]["severity"], "error");
    assert_eq!(result.outcome["issue"][0]["code"], "invalid");
}

#[test]
fn transaction_with_six_patients_exceeds_recipe_maximum() {
    let validator = validator_with_tables();
    let mut entries: Vec<Value> = (0..6).map(|i| patient_entry(&format!("p{i}"))).collect();
    entries.push(json!({"resource": {"resourceType": "Provenance", "id": "prov-1"}}));

    let result = validator.validate(&transaction(entries));
    assert!(!result.valid);
    assert!(result
        .errors
        .contains(&"Too many Patient resources: found 6, maximum 5 allowed".to_string()));
}

#[test]
fn transaction_with_forbidden_organization() {
    let validator = validator_with_tables();
    let result = validator.validate(&transaction(vec![
        patient_entry("p1"),
        json!({"resource": {"resourceType": "Provenance", "id": "prov-1"}}),
        json!({"resource": {"resourceType": "Organization", "id": "org-1"}}),
    ]));

    assert!(!result.valid);
    assert!(result
        .errors
        .contains(&"Forbidden resource type in bundle: Organization".to_string()));
}

#[test]
fn transaction_without_provenance() {
    let validator = validator_with_tables();
    let result = validator.validate(&transaction(vec![patient_entry("p1")]));

    assert!(!result.valid);
    assert!(result
        .errors
        .contains(&"Missing required Provenance resource in transaction".to_string()));
}

#[test]
fn message_header_missing_fields_reported_in_recipe_order() {
    let validator = validator_with_tables();
    let result = validator.validate(&json!({
        "resourceType": "Bundle",
        "type": "message",
        "entry": [{"resource": {"resourceType": "MessageHeader", "id": "mh-1"}}]
    }));

    assert!(!result.valid);
    assert_eq!(
        result.errors,
        vec![
            "Missing required MessageHeader field: eventCoding".to_string(),
            "Missing required MessageHeader field: source".to_string(),
            "Missing required MessageHeader field: focus".to_string(),
        ]
    );
}

// ---------------------------------------------------------------------------
// Universal properties
// ---------------------------------------------------------------------------

#[test]
fn valid_flag_mirrors_error_list() {
    let validator = validator_with_tables();
    let documents = [
        json!({"resourceType": "Patient"}),
        json!({"resourceType": "Patient", "address": [{"postalCode": "INVALID"}]}),
        json!({"id": "no-type"}),
        transaction(vec![patient_entry("p1")]),
    ];
    for doc in &documents {
        let result = validator.validate(doc);
        assert_eq!(result.valid, result.errors.is_empty());
        assert!(
            !result.outcome["issue"].as_array().unwrap().is_empty(),
            "outcome must never have an empty issue list"
        );
    }
}

#[test]
fn validation_is_deterministic_up_to_ordering() {
    let validator = validator_with_tables();
    let doc = transaction(vec![
        patient_entry("p1"),
        json!({"resource": {"resourceType": "Organization", "id": "org-1"}}),
    ]);

    let mut first = validator.validate(&doc).errors;
    let mut second = validator.validate(&doc).errors;
    first.sort();
    second.sort();
    assert_eq!(first, second);
}

#[test]
fn validate_never_mutates_the_document() {
    let validator = validator_with_tables();
    let doc = json!({
        "resourceType": "Bundle",
        "type": "transaction",
        "entry": [
            patient_entry("p1"),
            {"resource": {"resourceType": "Provenance", "id": "prov-1",
                          "target": [{"reference": "Patient/p1"}]}}
        ]
    });
    let before = serde_json::to_vec(&doc).unwrap();
    let _ = validator.validate(&doc);
    assert_eq!(serde_json::to_vec(&doc).unwrap(), before);
}

#[test]
fn bundles_within_the_entry_limit_never_hit_the_limit_error() {
    let validator = validator_with_tables();
    let entries: Vec<Value> = (0..MAX_BUNDLE_ENTRIES)
        .map(|i| patient_entry(&format!("p{i}")))
        .collect();
    let result = validator.validate(&json!({
        "resourceType": "Bundle",
        "type": "collection",
        "entry": entries
    }));
    assert!(!result
        .errors
        .iter()
        .any(|e| e.starts_with("bundle contains too many entries")));
}

#[test]
fn inserted_references_are_always_collected() {
    let reference = "Observation/obs-42";
    let shapes = [
        json!({"reference": reference}),
        json!({"a": {"b": {"reference": reference}}}),
        json!({"list": [[{"reference": reference}]]}),
        json!({"x": [{"y": {"z": [{"reference": reference}]}}]}),
    ];
    for shape in &shapes {
        let refs = collect_references(shape);
        assert!(
            refs.contains(&reference.to_string()),
            "reference lost in shape {shape}"
        );
    }
}

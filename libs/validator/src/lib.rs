//! Rule-driven validation for FHIR R4 resources and bundles.
//!
//! # Architecture
//!
//! The validator separates configuration, loading, and execution:
//!
//! ```text
//! rules.yaml / recipes.yaml / profiles/*.json → loader (cached) → Validator (reusable)
//! ```
//!
//! Configuration is data, not code: a [`RuleTable`] holds per-resource-type
//! field rules, a [`RecipeBook`] holds bundle-shape recipes, and a
//! [`ProfileStore`] holds the consumed slice of StructureDefinitions. All
//! three are frozen after load and shared by reference.
//!
//! A [`Validator`] owns the loaded tables plus a [`ValidationMetrics`]
//! handle. Each [`Validator::validate`] call is pure over the input document
//! and the tables; the only side effect is the metrics update. Validation
//! walks three layers:
//!
//! 1. field rules (min / max / fixed / allowed / pattern) resolved through
//!    the dotted-path engine in [`path`],
//! 2. bundle recipes for `transaction` and `message` bundles,
//! 3. cross-reference integrity inside transaction bundles.
//!
//! Every finding is collected into an ordered error list and rendered as a
//! FHIR OperationOutcome; nothing is recovered or retried inside the core.

mod bundle;
mod loader;
mod metrics;
mod outcome;
pub mod path;
mod profiles;
mod recipes;
mod rules;
mod validator;

pub use bundle::{collect_references, validate_message_bundle, validate_transaction_bundle};
pub use loader::{clear_caches, load_profiles, load_recipes, load_rules, LoadError};
pub use metrics::{MetricsSnapshot, ValidationMetrics};
pub use outcome::{error_outcome, operation_outcome, success_outcome, ValidationResult};
pub use profiles::{ElementDefinition, ProfileStore, StructureDefinition};
pub use recipes::{MessageRule, MustReference, Recipe, RecipeBook, RequiredResource};
pub use rules::{FieldRule, RuleTable};
pub use validator::{Validator, ValidatorBuilder};

/// Largest request body accepted for validation, in bytes.
pub const MAX_REQUEST_SIZE: usize = 10 * 1024 * 1024;

/// Largest number of entries accepted in a single bundle.
pub const MAX_BUNDLE_ENTRIES: usize = 1000;

/// Upper bound on wall time for a single validation, enforced by the
/// surrounding HTTP handler via transport deadlines.
pub const MAX_VALIDATION_TIME_SECS: u64 = 30;

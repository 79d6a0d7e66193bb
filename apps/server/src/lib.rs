//! Validating FHIR R4 reverse proxy.
//!
//! Incoming resources are validated by `fhirgate-validator` against the
//! configured rule tables and bundle recipes; valid traffic is forwarded to
//! the upstream FHIR store (when one is configured) and everything else is
//! answered with an OperationOutcome.

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;
pub mod upstream;

pub use error::{Error, Result};

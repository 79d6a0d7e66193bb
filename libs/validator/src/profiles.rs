//! Minimal StructureDefinition consumption.
//!
//! Only the `url` and the `snapshot.element[].{path,min}` slice of each
//! profile is read; everything else in the document is ignored.

use serde::Deserialize;
use std::collections::HashMap;

/// One element constraint from a profile snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ElementDefinition {
    pub path: String,
    pub min: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub element: Vec<ElementDefinition>,
}

/// The consumed slice of a FHIR StructureDefinition.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StructureDefinition {
    pub url: String,
    pub snapshot: Snapshot,
}

impl StructureDefinition {
    /// Resource type asserted by the profile: the root element path, which
    /// by convention has no dot (e.g. `Patient`).
    pub fn resource_type(&self) -> Option<&str> {
        self.snapshot
            .element
            .first()
            .map(|e| e.path.as_str())
            .filter(|p| !p.is_empty() && !p.contains('.'))
    }
}

/// Profiles keyed by canonical URL. Profiles without a `url` are dropped at
/// load time.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: HashMap<String, StructureDefinition>,
}

impl ProfileStore {
    pub fn insert(&mut self, profile: StructureDefinition) {
        if !profile.url.is_empty() {
            self.profiles.insert(profile.url.clone(), profile);
        }
    }

    pub fn get(&self, url: &str) -> Option<&StructureDefinition> {
        self.profiles.get(url)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Distinct resource types covered by the loaded profiles, sorted.
    /// Feeds the synthesized CapabilityStatement.
    pub fn resource_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self
            .profiles
            .values()
            .filter_map(|p| p.resource_type())
            .map(str::to_string)
            .collect();
        types.sort();
        types.dedup();
        types
    }
}

//! Bundle recipes: locally defined shape policies for transaction and
//! message bundles, loaded from `recipes.yaml`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Expected population of one resource type inside a bundle.
///
/// `min_count == 0` in configuration means "defaulted to 1".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequiredResource {
    pub resource_type: String,
    pub min_count: u32,
    pub max_count: u32,
    pub validation: String,
}

impl RequiredResource {
    /// Effective minimum: a configured 0 defaults to 1.
    pub fn effective_min(&self) -> u32 {
        if self.min_count == 0 {
            1
        } else {
            self.min_count
        }
    }
}

/// At least one resource of type `source` must carry a reference with the
/// prefix `"<target>/"`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MustReference {
    pub source: String,
    pub target: String,
}

/// Top-level field presence rule applied to each MessageHeader resource.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageRule {
    pub field: String,
    pub required: bool,
}

/// A bundle-shape policy.
///
/// `conditional_rules` and `data_quality` are reserved: they are accepted so
/// that deployed recipe files keep parsing, but nothing evaluates them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Recipe {
    pub required_resources: Vec<RequiredResource>,
    pub forbidden_resources: Vec<String>,
    pub must_reference: Vec<MustReference>,
    pub message_validation: Vec<MessageRule>,
    pub conditional_rules: Vec<Value>,
    pub data_quality: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RecipeConfig {
    #[serde(default)]
    transaction: HashMap<String, Recipe>,
    #[serde(default)]
    message: HashMap<String, Recipe>,
}

/// Loaded recipes keyed `transaction:<name>` / `message:<name>`.
#[derive(Debug, Clone, Default)]
pub struct RecipeBook {
    recipes: HashMap<String, Recipe>,
}

impl RecipeBook {
    pub fn from_yaml(input: &str) -> Result<Self, serde_yaml::Error> {
        let config: RecipeConfig = serde_yaml::from_str(input)?;
        let mut recipes = HashMap::new();
        for (name, recipe) in config.transaction {
            recipes.insert(format!("transaction:{name}"), recipe);
        }
        for (name, recipe) in config.message {
            recipes.insert(format!("message:{name}"), recipe);
        }
        Ok(Self { recipes })
    }

    pub fn get(&self, key: &str) -> Option<&Recipe> {
        self.recipes.get(key)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

//! Shared application state

use std::sync::Arc;

use anyhow::Context;
use fhirgate_validator::{load_profiles, load_recipes, load_rules, Validator};

use crate::{config::Config, upstream::UpstreamClient};

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub validator: Arc<Validator>,
    pub upstream: Option<Arc<UpstreamClient>>,
}

impl AppState {
    /// Initialize the application state: run the configuration loaders and
    /// construct the upstream client. Loader failures are fatal.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        tracing::info!("Initializing application state...");

        let rules = load_rules(&config.validation.custom_rules_path)
            .with_context(|| format!("loading rules from {}", config.validation.custom_rules_path))?;
        let recipes = load_recipes(&config.validation.recipes_path)
            .with_context(|| format!("loading recipes from {}", config.validation.recipes_path))?;
        let profiles = load_profiles(&config.validation.profiles_path)
            .with_context(|| format!("loading profiles from {}", config.validation.profiles_path))?;

        let validator = Validator::builder()
            .shared_rules(rules)
            .shared_recipes(recipes)
            .shared_profiles(profiles)
            .build();

        let upstream = match config.fhir_store_url() {
            Some(base_url) => Some(Arc::new(UpstreamClient::new(base_url)?)),
            None => None,
        };

        tracing::info!("Application state initialized");

        Ok(Self {
            config: Arc::new(config),
            validator: Arc::new(validator),
            upstream,
        })
    }

    /// Assemble state from pre-built parts. Test hook: lets the API tests
    /// run against in-memory tables without touching the filesystem.
    pub fn from_parts(
        config: Config,
        validator: Validator,
        upstream: Option<UpstreamClient>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            validator: Arc::new(validator),
            upstream: upstream.map(Arc::new),
        }
    }
}

//! Configuration management for the proxy.
//!
//! Precedence: coded defaults, then the optional `server.yaml` file, then a
//! fixed set of environment variables. The environment names are part of the
//! deployment contract and override whatever the file says.

use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub google_cloud: GoogleCloudConfig,
    pub validation: ValidationConfig,
    pub security: SecurityConfig,
    pub monitoring: MonitoringConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub read_timeout_seconds: u64,
    pub write_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            read_timeout_seconds: 10,
            write_timeout_seconds: 10,
            idle_timeout_seconds: 60,
        }
    }
}

/// Upstream FHIR store coordinates. Either an explicit `base_url` or the
/// four Google Healthcare API identifiers; all empty means validate-only.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GoogleCloudConfig {
    pub project_id: String,
    pub location: String,
    pub dataset_id: String,
    pub fhir_store_id: String,
    pub service_account_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub strict_mode: bool,
    pub profile_validation: bool,
    pub custom_rules_path: String,
    pub profiles_path: String,
    pub recipes_path: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict_mode: true,
            profile_validation: true,
            custom_rules_path: "configs/rules.yaml".to_string(),
            profiles_path: "configs/profiles".to_string(),
            recipes_path: "configs/recipes.yaml".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub require_authentication: bool,
    pub audit_logging: bool,
    pub encryption_required: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            require_authentication: false,
            audit_logging: true,
            encryption_required: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enable_metrics: bool,
    pub metrics_port: u16,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            enable_metrics: true,
            metrics_port: 9090,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Use JSON formatting for logs (recommended for production)
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from the config file and environment variables.
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let file =
            std::env::var("FHIRGATE_CONFIG").unwrap_or_else(|_| "configs/server".to_string());

        let raw = config::Config::builder()
            .add_source(config::File::with_name(&file).required(false))
            .build()?;

        let mut config: Self = raw.try_deserialize()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Environment overrides; these names are a fixed deployment contract.
    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Ok(url) = std::env::var("FHIR_SERVER_URL") {
            self.google_cloud.base_url = url;
        }
        if let Ok(project_id) = std::env::var("GOOGLE_CLOUD_PROJECT") {
            self.google_cloud.project_id = project_id;
        }
        if let Ok(location) = std::env::var("GOOGLE_CLOUD_LOCATION") {
            self.google_cloud.location = location;
        }
        if let Ok(dataset_id) = std::env::var("GOOGLE_CLOUD_DATASET_ID") {
            self.google_cloud.dataset_id = dataset_id;
        }
        if let Ok(store_id) = std::env::var("GOOGLE_CLOUD_FHIR_STORE_ID") {
            self.google_cloud.fhir_store_id = store_id;
        }
        if let Ok(key) = std::env::var("GOOGLE_APPLICATION_CREDENTIALS") {
            self.google_cloud.service_account_key = key;
        }
        if let Ok(strict) = std::env::var("VALIDATION_STRICT_MODE") {
            self.validation.strict_mode = strict == "true";
        }
        if let Ok(require) = std::env::var("REQUIRE_AUTHENTICATION") {
            self.security.require_authentication = require == "true";
        }
    }

    /// Full URL of the upstream FHIR store, or `None` in validate-only mode.
    ///
    /// An explicit `base_url` wins; otherwise the Google Healthcare API URL
    /// is assembled when all four store identifiers are present.
    pub fn fhir_store_url(&self) -> Option<String> {
        let gc = &self.google_cloud;
        if !gc.base_url.is_empty() {
            return Some(gc.base_url.trim_end_matches('/').to_string());
        }
        if !gc.project_id.is_empty()
            && !gc.location.is_empty()
            && !gc.dataset_id.is_empty()
            && !gc.fhir_store_id.is_empty()
        {
            return Some(format!(
                "https://healthcare.googleapis.com/v1/projects/{}/locations/{}/datasets/{}/fhirStores/{}/fhir",
                gc.project_id, gc.location, gc.dataset_id, gc.fhir_store_id
            ));
        }
        None
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        Ok(addr.parse()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.validation.custom_rules_path.is_empty() {
            return Err("validation.custom_rules_path must be set".to_string());
        }
        if self.validation.recipes_path.is_empty() {
            return Err("validation.recipes_path must be set".to_string());
        }
        if self.validation.profiles_path.is_empty() {
            return Err("validation.profiles_path must be set".to_string());
        }
        if self.server.read_timeout_seconds == 0 || self.server.write_timeout_seconds == 0 {
            return Err("server timeouts must be > 0".to_string());
        }
        Ok(())
    }
}

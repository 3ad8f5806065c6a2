//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the settings
//! service client, the config store server, and the CLI.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Remote config store the controller talks to.
    pub service: ServiceConfig,

    /// Method registry source and membership policy.
    pub registry: RegistryConfig,

    /// Config store server settings.
    pub store: StoreConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Remote config store client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the store (e.g., "http://127.0.0.1:7777").
    pub base_url: String,

    /// Path of the configs resource, appended to `base_url`.
    pub configs_path: String,

    /// Path of the method catalog, appended to `base_url`.
    pub methods_path: String,

    /// Deadline for a single fetch or submit attempt in seconds.
    pub timeout_secs: u64,

    /// Retry policy for fetches.
    pub retries: RetryConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:7777".to_string(),
            configs_path: "/api/configs".to_string(),
            methods_path: "/api/methods".to_string(),
            timeout_secs: 10,
            retries: RetryConfig::default(),
        }
    }
}

/// Retry configuration. Only fetches are ever retried.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Enable retries.
    pub enabled: bool,

    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Method registry configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path to the JSON method catalog. An empty registry is used when unset.
    pub path: Option<String>,

    /// Reject method identifiers missing from the registry.
    pub require_registered_methods: bool,
}

/// Config store server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Bind address (e.g., "0.0.0.0:7777").
    pub bind_address: String,

    /// Optional JSON draft payload the store starts from.
    pub seed_path: Option<String>,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:7777".to_string(),
            seed_path: None,
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.service.base_url, "http://127.0.0.1:7777");
        assert_eq!(config.service.configs_path, "/api/configs");
        assert_eq!(config.service.methods_path, "/api/methods");
        assert_eq!(config.service.retries.max_attempts, 3);
        assert!(config.registry.path.is_none());
        assert!(!config.registry.require_registered_methods);
        assert_eq!(config.store.bind_address, "0.0.0.0:7777");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
[service]
base_url = "http://atm.internal:8000"

[service.retries]
max_attempts = 5

[registry]
require_registered_methods = true
"#,
        )
        .unwrap();
        assert_eq!(config.service.base_url, "http://atm.internal:8000");
        assert_eq!(config.service.timeout_secs, 10);
        assert_eq!(config.service.retries.max_attempts, 5);
        assert!(config.service.retries.enabled);
        assert!(config.registry.require_registered_methods);
    }
}

//! Startup orchestration for the store server.
//!
//! # Responsibilities
//! - Load the method registry named by the config
//! - Load the seed draft, if any
//! - Assemble the [`ConfigStore`] the server fronts

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use crate::config::AppConfig;
use crate::draft::{
    ConfigDraft, DraftValidator, MethodRegistry, RegistryError, ValidationPolicy,
};
use crate::store::{load_seed, ConfigStore, StoreError};

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Seed(#[from] StoreError),
}

/// Registry named by `[registry] path`, or an empty one.
pub fn load_registry(config: &AppConfig) -> Result<Arc<MethodRegistry>, RegistryError> {
    match config.registry.path.as_deref() {
        Some(path) => Ok(Arc::new(MethodRegistry::load(Path::new(path))?)),
        None => {
            tracing::debug!("No method registry configured");
            Ok(Arc::new(MethodRegistry::default()))
        }
    }
}

/// Validator carrying the configured registry and policy.
pub fn build_validator(config: &AppConfig) -> Result<DraftValidator, RegistryError> {
    let registry = load_registry(config)?;
    let policy = ValidationPolicy {
        require_registered_methods: config.registry.require_registered_methods,
    };
    Ok(DraftValidator::new(registry, policy))
}

pub fn build_store(config: &AppConfig) -> Result<Arc<ConfigStore>, StartupError> {
    let validator = build_validator(config)?;
    let seed = match config.store.seed_path.as_deref() {
        Some(path) => {
            let seed = load_seed(Path::new(path))?;
            tracing::info!(path, methods = seed.methods.len(), "Seed draft loaded");
            seed
        }
        None => ConfigDraft::default(),
    };
    Ok(Arc::new(ConfigStore::new(seed, validator)))
}

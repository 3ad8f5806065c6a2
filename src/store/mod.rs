//! In-process config store: the remote source of truth the controller
//! fetches from and submits to.
//!
//! # Data Flow
//! ```text
//! GET  /api/configs  → current ConfigDraft
//! POST /api/configs  → overlay payload → validate → swap in | {success:false}
//! GET  /api/methods  → method registry
//! GET  /health       → liveness
//! ```
//!
//! # Design Decisions
//! - The stored draft is an `ArcSwap<ConfigDraft>`; readers never block writers
//! - Well-formed but invalid drafts are declined with `{success:false}`,
//!   undecodable bodies get a 400

pub mod handlers;
pub mod server;

use std::fs;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;

use crate::draft::{ConfigDraft, DraftPayload, DraftValidator, MethodRegistry, ValidationError};

pub use server::StoreServer;

/// Errors raised while preparing the store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read seed draft {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid seed draft: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Holds the accepted configuration.
#[derive(Debug)]
pub struct ConfigStore {
    current: ArcSwap<ConfigDraft>,
    validator: DraftValidator,
}

impl ConfigStore {
    pub fn new(seed: ConfigDraft, validator: DraftValidator) -> Self {
        Self {
            current: ArcSwap::from_pointee(seed),
            validator,
        }
    }

    pub fn current(&self) -> Arc<ConfigDraft> {
        self.current.load_full()
    }

    pub fn registry(&self) -> &MethodRegistry {
        self.validator.registry()
    }

    /// Overlay `payload` on the stored draft and keep it if it validates.
    pub fn accept(&self, payload: DraftPayload) -> Result<Arc<ConfigDraft>, Vec<ValidationError>> {
        loop {
            let current = self.current.load_full();
            let candidate = Arc::new(current.overlay(payload.clone()));
            self.validator.check_draft(&candidate)?;
            let previous = self.current.compare_and_swap(&current, Arc::clone(&candidate));
            if Arc::ptr_eq(&*previous, &current) {
                return Ok(candidate);
            }
        }
    }
}

/// Read a seed payload from disk and overlay it on the default draft.
pub fn load_seed(path: &Path) -> Result<ConfigDraft, StoreError> {
    let raw = fs::read_to_string(path).map_err(|source| StoreError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let payload: DraftPayload = serde_json::from_str(&raw)?;
    Ok(ConfigDraft::default().overlay(payload))
}

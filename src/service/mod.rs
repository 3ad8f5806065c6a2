//! Remote configuration store boundary.
//!
//! # Data Flow
//! ```text
//! DraftController::open
//!     → ConfigService::fetch → DraftPayload
//!
//! DraftController::submit
//!     → ConfigService::submit(&ConfigDraft) → SubmitResponse { success }
//! ```
//!
//! # Design Decisions
//! - The controller only sees the trait; transports are swappable
//! - `success: false` is a reported rejection, not a call failure
//! - Every call resolves to exactly one of Ok or Err

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::draft::{ConfigDraft, DraftPayload};

pub use http::HttpConfigService;

/// Call-level failures of the configuration service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The remote store could not be reached or answered with an error status.
    #[error("network error: {0}")]
    Network(String),

    /// The remote store answered with a body that does not decode.
    #[error("malformed payload: {0}")]
    Parse(String),
}

/// Reply to a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
}

/// Contract of the remote source of truth for the tuning configuration.
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Current configuration as the store sees it; fields may be missing.
    async fn fetch(&self) -> Result<DraftPayload, ServiceError>;

    /// Offer a complete draft to the store.
    async fn submit(&self, draft: &ConfigDraft) -> Result<SubmitResponse, ServiceError>;
}

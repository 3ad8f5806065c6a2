//! Tuning Settings Library
//!
//! Draft controller for hyperparameter-search settings, the HTTP client it
//! uses to reach the config store, and the store server itself.

pub mod config;
pub mod controller;
pub mod draft;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod service;
pub mod store;

pub use config::schema::AppConfig;
pub use controller::{ControllerError, DraftController, SessionState};
pub use draft::{ConfigDraft, DraftValidator, MethodRegistry};
pub use lifecycle::Shutdown;
pub use service::{ConfigService, HttpConfigService};
pub use store::StoreServer;

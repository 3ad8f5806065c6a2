//! Draft data model and validation.
//!
//! # Data Flow
//! ```text
//! remote payload (JSON)
//!     → model.rs (DraftPayload overlaid on the prior ConfigDraft)
//!
//! view / CLI edit (field name + FieldValue)
//!     → validators.rs (typed FieldUpdate or ValidationError)
//!     → model.rs (ConfigDraft::with → new snapshot)
//!
//! submit
//!     → validators.rs (whole-draft check, all violations)
//! ```
//!
//! # Design Decisions
//! - Enum fields are closed sets, never free strings
//! - The method registry is injected, never loaded globally
//! - Registry membership of `methods` is opt-in through `ValidationPolicy`

pub mod model;
pub mod registry;
pub mod validators;

pub use model::{
    BudgetType, ClosedSet, ConfigDraft, DraftPayload, FieldName, FieldUpdate, FieldValue,
    MethodId, Metric, Selector, Tuner,
};
pub use registry::{MethodInfo, MethodRegistry, RegistryError};
pub use validators::{DraftValidator, ValidationError, ValidationPolicy};

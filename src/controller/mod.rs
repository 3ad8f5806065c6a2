//! Editing-session controller.
//!
//! # Data Flow
//! ```text
//! open()    Closed → Loading → (fetch) → Open | Closed + error
//! set()     Open → Open (validated, one field, new snapshot)
//! undo()    Open → Open (previous snapshot)
//! submit()  Open → (validate) → Submitting → (submit) → Closed | Open + error
//! cancel()  Open | Loading → Closed
//! ```
//!
//! # Design Decisions
//! - One generation counter tags every fetch and submit; late results from
//!   an older generation are dropped
//! - Fetch and submit failures are recorded on the snapshot as well as returned

pub mod draft_controller;
pub mod error;
pub mod state;

pub use draft_controller::{submission_failure, DraftController, HISTORY_LIMIT};
pub use error::{ControllerError, RejectReason};
pub use state::{Operation, SessionState, Snapshot};

//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Fetch from the config store:
//!     → tokio timeout per attempt
//!     → On failure: retries.rs (check if retryable)
//!     → backoff.rs (exponential delay + jitter) → next attempt
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every remote call has a deadline
//! - Retries only for the idempotent fetch, never for submit
//! - Jittered backoff prevents synchronized retries from many clients

pub mod backoff;
pub mod retries;

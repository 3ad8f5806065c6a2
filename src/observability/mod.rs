//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Controller, service client and store produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout via the fmt layer
//!     → Prometheus scrape endpoint (store binary, optional)
//! ```

pub mod logging;
pub mod metrics;

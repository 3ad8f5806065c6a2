//! Metrics collection and exposition.
//!
//! # Metrics
//! - `draft_transitions_total` (counter): session transitions by from, to
//! - `draft_service_calls_total` (counter): config store calls by operation, outcome
//! - `store_submissions_total` (counter): submissions seen by the store, by outcome
//!
//! # Design Decisions
//! - Counters are no-ops until a recorder is installed
//! - Labels are static strings only

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with an HTTP scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_transition(from: &'static str, to: &'static str) {
    metrics::counter!("draft_transitions_total", "from" => from, "to" => to).increment(1);
}

pub fn record_service_call(operation: &'static str, outcome: &'static str) {
    metrics::counter!(
        "draft_service_calls_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_store_submission(outcome: &'static str) {
    metrics::counter!("store_submissions_total", "outcome" => outcome).increment(1);
}

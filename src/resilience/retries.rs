//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failed fetch attempt may be repeated
//! - Bound the number of attempts from config
//!
//! # Design Decisions
//! - Only fetch (GET) is retried; submit (POST) never is
//! - Connection errors, timeouts and 5xx are retryable; 4xx are not

use reqwest::StatusCode;

use crate::config::RetryConfig;

/// How a single attempt against the remote store ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptFailure {
    /// The request never produced a response (connect error, reset, timeout).
    Transport,
    /// The store answered with a non-success status.
    Status(StatusCode),
}

/// Whether a failed fetch attempt is worth repeating.
pub fn is_retryable(failure: AttemptFailure) -> bool {
    match failure {
        AttemptFailure::Transport => true,
        AttemptFailure::Status(status) => status.is_server_error(),
    }
}

/// Total attempts a fetch may make under `retries`.
pub fn max_fetch_attempts(retries: &RetryConfig) -> u32 {
    if retries.enabled {
        retries.max_attempts.max(1)
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_transport_failures_retry() {
        assert!(is_retryable(AttemptFailure::Transport));
        assert!(is_retryable(AttemptFailure::Status(StatusCode::SERVICE_UNAVAILABLE)));
        assert!(!is_retryable(AttemptFailure::Status(StatusCode::NOT_FOUND)));
        assert!(!is_retryable(AttemptFailure::Status(StatusCode::BAD_REQUEST)));
    }

    #[test]
    fn disabled_retries_mean_one_attempt() {
        let mut retries = RetryConfig::default();
        assert_eq!(max_fetch_attempts(&retries), 3);
        retries.enabled = false;
        assert_eq!(max_fetch_attempts(&retries), 1);
        retries.enabled = true;
        retries.max_attempts = 0;
        assert_eq!(max_fetch_attempts(&retries), 1);
    }
}

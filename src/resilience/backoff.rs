//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::RetryConfig;

/// Delay to wait before retry number `attempt` (1-based).
///
/// Attempt 0 never waits. Jitter adds up to 10% on top of the capped delay.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let capped_delay = base_ms.saturating_mul(exponential_base).min(max_ms);

    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}

/// Backoff for the retry after `attempt` failed fetch attempts.
pub fn fetch_backoff(attempt: u32, retries: &RetryConfig) -> Duration {
    calculate_backoff(attempt, retries.base_delay_ms, retries.max_delay_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_double_and_stay_within_jitter() {
        let first = calculate_backoff(1, 100, 2000);
        assert!(first >= Duration::from_millis(100) && first < Duration::from_millis(110));

        let second = calculate_backoff(2, 100, 2000);
        assert!(second >= Duration::from_millis(200) && second < Duration::from_millis(220));
    }

    #[test]
    fn delay_is_capped() {
        let capped = calculate_backoff(20, 100, 1000);
        assert!(capped >= Duration::from_millis(1000) && capped < Duration::from_millis(1100));
    }

    #[test]
    fn zeroth_attempt_does_not_wait() {
        assert_eq!(calculate_backoff(0, 100, 1000), Duration::ZERO);
        let retries = RetryConfig {
            base_delay_ms: 0,
            max_delay_ms: 0,
            ..RetryConfig::default()
        };
        assert_eq!(fetch_backoff(3, &retries), Duration::ZERO);
    }
}

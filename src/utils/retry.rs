// Retry utilities - bounded retry with exponential backoff for transient probe failures
//
// Only transient outcomes (timeouts) are retried. Active protocol rejections
// are definitive answers from the peer and must never be retried, and an
// unreachable host aborts the whole target anyway.

use std::time::Duration;

/// Configuration for retry behavior with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts before recording the failure as final.
    pub max_retries: usize,

    /// Backoff before the first retry; doubled for each subsequent retry.
    pub initial_backoff: Duration,

    /// Upper bound on the backoff duration.
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        // One retry of a timed-out probe before giving up
        Self {
            max_retries: 1,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryConfig {
    /// Create a configuration with no retries (fail immediately).
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Backoff duration before retry attempt `attempt` (1-based).
    pub fn backoff_for(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }
        let exp = (attempt - 1).min(16) as u32;
        let backoff = self.initial_backoff.saturating_mul(1u32 << exp);
        backoff.min(self.max_backoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_retry() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 1);
    }

    #[test]
    fn test_backoff_doubles() {
        let config = RetryConfig {
            max_retries: 4,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(5),
        };

        assert_eq!(config.backoff_for(1), Duration::from_millis(100));
        assert_eq!(config.backoff_for(2), Duration::from_millis(200));
        assert_eq!(config.backoff_for(3), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_capped() {
        let config = RetryConfig {
            max_retries: 10,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(2),
        };

        assert_eq!(config.backoff_for(8), Duration::from_secs(2));
    }

    #[test]
    fn test_no_retry() {
        let config = RetryConfig::no_retry();
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.backoff_for(1), Duration::ZERO);
    }
}

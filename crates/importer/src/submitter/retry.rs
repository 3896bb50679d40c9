use crate::Result;
use crate::config::{DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Per-item retry with exponential backoff.
///
/// After failed attempt `n` (0-based) the item waits
/// `base_delay * 2^n` plus a random jitter of up to `base_delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// Deterministic part of the wait after failed attempt `attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let jitter = if base_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=base_ms)
        };

        self.backoff(attempt) + Duration::from_millis(jitter)
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are exhausted. The last error is returned.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;

    loop {
        let delay = {
            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if !error.is_retryable() || attempt + 1 >= policy.max_attempts {
                return Err(error);
            }

            let delay = policy.delay_for(attempt);
            debug!(
                "{}: attempt {}/{} failed ({}), retrying in {:?}",
                label,
                attempt + 1,
                policy.max_attempts,
                error,
                delay
            );
            delay
        };

        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImporterError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::new(5, Duration::from_millis(500));
        assert_eq!(policy.backoff(0), Duration::from_millis(500));
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_jitter_is_bounded_by_base() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        for attempt in 0..3 {
            for _ in 0..50 {
                let delay = policy.delay_for(attempt);
                assert!(delay >= policy.backoff(attempt));
                assert!(delay <= policy.backoff(attempt) + Duration::from_millis(100));
            }
        }
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result = with_retry(&policy, "item", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(ImporterError::Rejected("busy".to_string()))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result: Result<()> = with_retry(&policy, "item", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ImporterError::Rejected("duplicated".to_string()))
        })
        .await;

        assert!(matches!(result, Err(ImporterError::Rejected(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_local_validation_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(3, Duration::from_millis(1));

        let result: Result<()> = with_retry(&policy, "item", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ImporterError::ValidationError("email: invalid".to_string()))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

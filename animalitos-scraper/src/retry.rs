//! Retry-with-backoff driver shared by all pipeline phases
//!
//! The one place retries happen: phases never loop on their own. The
//! control flow is a plain loop over `Result`s; the last error is
//! returned at exhaustion, nothing is raised mid-flight.
//!
//! Backoff: failure of 0-indexed attempt `i` sleeps `base * 2^i` before
//! the next attempt; there is no sleep after the final attempt.

use crate::error::ScrapeError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Per-phase retry tunables.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt (`R >= 0`).
    pub max_retries: u32,
    /// Base back-off delay (`d >= 0`); doubles per failed attempt.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Total attempts this policy allows.
    pub fn attempts(&self) -> u32 {
        self.max_retries + 1
    }

    /// Delay after the failure of 0-indexed attempt `i`.
    pub fn delay_after(&self, failed_attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(failed_attempt)
    }
}

/// Run `op` under `policy`, returning the first success or the last
/// error once attempts are exhausted.
pub async fn run_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, ScrapeError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScrapeError>>,
{
    let mut failed: u32 = 0;

    loop {
        if failed > 0 {
            debug!(operation = label, attempt = failed + 1, "retrying");
        }

        match op().await {
            Ok(value) => {
                if failed > 0 {
                    info!(operation = label, attempt = failed + 1, "succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) => {
                if failed >= policy.max_retries {
                    error!(
                        operation = label,
                        attempts = policy.attempts(),
                        error = %e,
                        "retries exhausted"
                    );
                    return Err(e);
                }

                let delay = policy.delay_after(failed);
                warn!(
                    operation = label,
                    attempt = failed + 1,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
                failed += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(max_retries, Duration::from_millis(1))
    }

    #[tokio::test]
    async fn first_success_returns_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = run_with_backoff(fast_policy(3), "test_op", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, ScrapeError>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn exhaustion_attempts_exactly_retries_plus_one() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = run_with_backoff(fast_policy(2), "test_op", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(ScrapeError::Scraping("always fails".into())) }
        })
        .await;

        assert!(matches!(result, Err(ScrapeError::Scraping(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = run_with_backoff(fast_policy(3), "test_op", || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ScrapeError::Scraping("transient".into()))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = run_with_backoff(fast_policy(0), "test_op", || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(ScrapeError::Processing("nope".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn backoff_doubles_per_failed_attempt() {
        let policy = RetryPolicy::new(4, Duration::from_secs(2));
        assert_eq!(policy.delay_after(0), Duration::from_secs(2));
        assert_eq!(policy.delay_after(1), Duration::from_secs(4));
        assert_eq!(policy.delay_after(2), Duration::from_secs(8));
        assert_eq!(policy.attempts(), 5);
    }
}

//! Generic exponential-backoff retry combinator.
//!
//! Retry logic is kept independent of the model client: the combinator takes
//! the operation, the policy, and a failure-classification predicate, so it is
//! unit-testable with any error type.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Attempt budget and backoff shape for one retry loop.
/// `max_attempts` counts the initial call, so a policy of 5 attempts sleeps
/// at most 4 times.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_factor: u32,
}

/// Patient budget for rate limiting: the upstream is telling us to slow down,
/// so short initial delay but many attempts.
pub const RATE_LIMIT_POLICY: RetryPolicy = RetryPolicy {
    max_attempts: 5,
    initial_delay: Duration::from_secs(2),
    backoff_factor: 2,
};

/// Budget for generic transient service failures: fewer attempts, longer
/// initial delay.
pub const API_ERROR_POLICY: RetryPolicy = RetryPolicy {
    max_attempts: 3,
    initial_delay: Duration::from_secs(5),
    backoff_factor: 2,
};

/// Runs `operation` under `policy`, retrying failures for which
/// `is_retryable` returns true.
///
/// Each retry sleeps the current delay (a suspension point, never a busy
/// wait) and multiplies it by the backoff factor. A non-retryable failure is
/// returned immediately without sleeping; the last failure is returned once
/// the attempt budget is exhausted.
pub async fn retry_with_backoff<F, Fut, T, E>(
    policy: RetryPolicy,
    is_retryable: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 1u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && is_retryable(&e) => {
                warn!(
                    "attempt {attempt}/{} failed: {e}; retrying after {}s",
                    policy.max_attempts,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
                delay *= policy.backoff_factor;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    const TEST_POLICY: RetryPolicy = RetryPolicy {
        max_attempts: 5,
        initial_delay: Duration::from_secs(2),
        backoff_factor: 2,
    };

    #[tokio::test]
    async fn test_success_on_first_attempt_never_sleeps() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result = retry_with_backoff(TEST_POLICY, |_: &String| true, || {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Ok::<_, String>(42)
            }
        })
        .await;
        assert_eq!(result, Ok(42));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_four_failures_then_success_sleeps_exact_backoff() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let started = Instant::now();
        let result = retry_with_backoff(TEST_POLICY, |_: &String| true, || {
            let attempts = attempts.clone();
            async move {
                let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if count <= 4 {
                    Err("rate limited".to_string())
                } else {
                    Ok(count)
                }
            }
        })
        .await;
        assert_eq!(result, Ok(5));
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
        // Delays 2s, 4s, 8s, 16s with the paused clock
        assert_eq!(started.elapsed(), Duration::from_secs(2 + 4 + 8 + 16));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_returns_last_error_after_budget() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), String> = retry_with_backoff(TEST_POLICY, |_| true, || {
            let attempts = attempts.clone();
            async move {
                let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                Err(format!("failure {count}"))
            }
        })
        .await;
        assert_eq!(result, Err("failure 5".to_string()));
        assert_eq!(attempts.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_failure_returns_immediately() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let started = Instant::now();
        let result: Result<(), String> = retry_with_backoff(TEST_POLICY, |_| false, || {
            let attempts = attempts.clone();
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err("bad credentials".to_string())
            }
        })
        .await;
        assert_eq!(result, Err("bad credentials".to_string()));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_predicate_distinguishes_error_kinds() {
        #[derive(Debug)]
        enum Kind {
            Retryable,
            Fatal,
        }
        impl Display for Kind {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{self:?}")
            }
        }

        let attempts = Arc::new(AtomicUsize::new(0));
        let result: Result<(), Kind> =
            retry_with_backoff(TEST_POLICY, |e| matches!(e, Kind::Retryable), || {
                let attempts = attempts.clone();
                async move {
                    let count = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                    if count < 3 {
                        Err(Kind::Retryable)
                    } else {
                        Err(Kind::Fatal)
                    }
                }
            })
            .await;
        assert!(matches!(result, Err(Kind::Fatal)));
        // Two retryable failures were retried, the fatal one stopped the loop
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}

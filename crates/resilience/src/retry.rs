// crates/resilience/src/retry.rs
//! Bounded retry with a pluggable backoff policy

use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Delay strategy between attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// The same delay before every retry
    Fixed(Duration),
    /// Exponentially growing delay, capped at `max`
    Exponential {
        initial: Duration,
        multiplier: f64,
        max: Duration,
    },
}

/// Retry policy configuration
///
/// `max_attempts` counts the first attempt, so a policy of 3 performs at most
/// two retries. The default is three attempts with a fixed one second delay.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: usize,
    backoff: Backoff,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt bound and a fixed 1s delay
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            backoff: Backoff::Fixed(Duration::from_secs(1)),
        }
    }

    /// Sets a fixed delay between attempts
    pub fn with_fixed_delay(mut self, delay: Duration) -> Self {
        self.backoff = Backoff::Fixed(delay);
        self
    }

    /// Sets the backoff strategy
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Returns the maximum number of attempts
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Calculates the delay after the given failed attempt (1-based)
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        match self.backoff {
            Backoff::Fixed(delay) => delay,
            Backoff::Exponential {
                initial,
                multiplier,
                max,
            } => {
                let raw = initial.as_millis() as f64 * multiplier.powi((attempt - 1) as i32);
                let capped = raw.min(max.as_millis() as f64);
                Duration::from_millis(capped as u64)
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Outcome of a cancellable retry sequence
///
/// `Operation` carries the final attempt's error unchanged so callers can
/// match on the underlying type.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The cancellation token fired before or between attempts
    #[error("Operation was cancelled")]
    Cancelled,

    /// Every permitted attempt failed; this is the last error
    #[error("{0}")]
    Operation(E),
}

impl<E> RetryError<E> {
    /// Returns the underlying operation error, if any
    pub fn into_operation(self) -> Option<E> {
        match self {
            RetryError::Cancelled => None,
            RetryError::Operation(e) => Some(e),
        }
    }
}

/// Retries `operation` on every failure, up to the policy's bound
///
/// On success the value is returned immediately. Once the bound is reached
/// the last error is propagated unchanged. Sleeps happen only between
/// attempts, never after the final one, and suspend the task rather than
/// blocking a worker thread.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_if(policy, operation, |_| true).await
}

/// Retries `operation` only while `is_retryable` approves the error
///
/// A rejected error is returned unchanged without further attempts.
pub async fn retry_if<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    mut operation: F,
    is_retryable: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= policy.max_attempts() || !is_retryable(&e) {
                    return Err(e);
                }

                tokio::time::sleep(policy.delay_for_attempt(attempt)).await;
                attempt += 1;
            }
        }
    }
}

/// Cancellable variant of [`retry`]
pub async fn retry_cancellable<T, E, F, Fut>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_if_cancellable(policy, token, operation, |_| true).await
}

/// Cancellable variant of [`retry_if`]
///
/// The token is checked before every attempt and raced against the
/// inter-attempt sleep, so a cancelled sequence stops without waiting out
/// its delay.
pub async fn retry_if_cancellable<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    token: &CancellationToken,
    mut operation: F,
    is_retryable: P,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let mut attempt = 1;

    loop {
        if token.is_cancelled() {
            return Err(RetryError::Cancelled);
        }

        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                if attempt >= policy.max_attempts() || !is_retryable(&e) {
                    return Err(RetryError::Operation(e));
                }

                tokio::select! {
                    _ = token.cancelled() => return Err(RetryError::Cancelled),
                    _ = tokio::time::sleep(policy.delay_for_attempt(attempt)) => {}
                }
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn zero_delay(max_attempts: usize) -> RetryPolicy {
        RetryPolicy::new(max_attempts).with_fixed_delay(Duration::ZERO)
    }

    #[test]
    fn test_policy_default() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
    }

    #[test]
    fn test_fixed_delay_is_constant() {
        let policy = RetryPolicy::new(5).with_fixed_delay(Duration::from_millis(250));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(250));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(250));
    }

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy::new(4).with_backoff(Backoff::Exponential {
            initial: Duration::from_millis(100),
            multiplier: 2.0,
            max: Duration::from_secs(30),
        });

        assert_eq!(policy.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(400));
    }

    #[test]
    fn test_exponential_backoff_capped() {
        let policy = RetryPolicy::new(10).with_backoff(Backoff::Exponential {
            initial: Duration::from_secs(1),
            multiplier: 2.0,
            max: Duration::from_secs(5),
        });

        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<i32, &str> = retry(&zero_delay(3), || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(42) }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_success_on_second_attempt() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<i32, &str> = retry(&zero_delay(3), || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err("transient")
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_all_attempts_fail_propagates_last_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<i32, String> = retry(&zero_delay(3), || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move { Err(format!("failure {}", n + 1)) }
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.unwrap_err(), "failure 3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleeps_only_between_attempts() {
        let delay = Duration::from_millis(500);
        let policy = RetryPolicy::new(3).with_fixed_delay(delay);
        let start = tokio::time::Instant::now();

        let result: Result<i32, &str> = retry(&policy, || async { Err("always") }).await;

        assert!(result.is_err());
        // Two sleeps: between attempts 1-2 and 2-3, none after the third
        assert_eq!(start.elapsed(), delay * 2);
    }

    #[tokio::test]
    async fn test_retry_if_stops_on_non_retryable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<i32, &str> = retry_if(
            &zero_delay(5),
            || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Err("fatal") }
            },
            |e: &&str| *e != "fatal",
        )
        .await;

        assert_eq!(result.unwrap_err(), "fatal");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cancel_before_first_attempt() {
        let token = CancellationToken::new();
        token.cancel();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        let result: Result<i32, RetryError<&str>> = retry_cancellable(&zero_delay(3), &token, || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err("never reached") }
        })
        .await;

        assert!(matches!(result, Err(RetryError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_delay() {
        let policy = RetryPolicy::new(3).with_fixed_delay(Duration::from_secs(60));
        let token = CancellationToken::new();
        let cancel = token.clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            cancel.cancel();
        });

        let result: Result<i32, RetryError<&str>> =
            retry_cancellable(&policy, &token, || async { Err("always") }).await;

        assert!(matches!(result, Err(RetryError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancellable_propagates_operation_error() {
        let token = CancellationToken::new();

        let result: Result<i32, RetryError<&str>> =
            retry_cancellable(&zero_delay(2), &token, || async { Err("persistent") }).await;

        match result {
            Err(RetryError::Operation(e)) => assert_eq!(e, "persistent"),
            other => panic!("Expected Operation error, got {:?}", other),
        }
    }

    #[test]
    fn test_into_operation() {
        let err: RetryError<&str> = RetryError::Operation("boom");
        assert_eq!(err.into_operation(), Some("boom"));

        let cancelled: RetryError<&str> = RetryError::Cancelled;
        assert_eq!(cancelled.into_operation(), None);
    }
}

// crates/resilience/src/timeout.rs
//! Timeout handling utilities

use crate::error::{ResilienceError, ResilienceResult};
use std::future::Future;
use std::time::Duration;

/// Awaits `future` for at most `duration`
///
/// An elapsed deadline drops the future and returns
/// [`ResilienceError::Timeout`].
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> ResilienceResult<T>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, future)
        .await
        .map_err(|_| ResilienceError::Timeout(duration))
}

// crates/resilience/src/lib.rs
//! Resilience patterns for fault-tolerant operations
//!
//! This module provides:
//! - Bounded retry with a pluggable backoff policy (fixed delay by default)
//! - Cancellation-aware retry variants
//! - Timeout handling
//!
//! # Example
//!
//! ```rust
//! use clipstream_resilience::{Backoff, RetryPolicy};
//! use std::time::Duration;
//!
//! // Three attempts, one second between them
//! let policy = RetryPolicy::new(3);
//!
//! // Exponential backoff instead
//! let policy = RetryPolicy::new(5).with_backoff(Backoff::Exponential {
//!     initial: Duration::from_millis(100),
//!     multiplier: 2.0,
//!     max: Duration::from_secs(30),
//! });
//! ```

mod error;
mod retry;
mod timeout;

pub use error::{ResilienceError, ResilienceResult};
pub use retry::{
    retry, retry_cancellable, retry_if, retry_if_cancellable, Backoff, RetryError, RetryPolicy,
};
pub use timeout::with_timeout;

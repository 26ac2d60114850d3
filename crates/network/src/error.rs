// crates/network/src/error.rs
//! Error types for network operations

use thiserror::Error;

/// Result type for network operations
pub type NetworkResult<T> = Result<T, NetworkError>;

/// Errors that can occur during network operations
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connectivity state was disconnected at call time; no attempt was made
    #[error("No network connection")]
    NoConnection,

    /// Base address and endpoint path do not combine into a well-formed URL
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// An auth-requiring endpoint was called without a bearer token
    #[error("Missing auth token for {0}")]
    MissingAuthToken(String),

    /// Transport succeeded but the response was not interpretable as HTTP
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Status code outside 200-299, preserved verbatim
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Lower-level transport failure (DNS, TLS, socket)
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Success status but the body did not parse into the expected shape
    #[error("Failed to decode response body: {0}")]
    DecodingFailed(#[source] serde_json::Error),

    /// Cache storage error surfaced alongside a fetch
    #[error("Cache storage error: {0}")]
    Storage(#[from] clipstream_cache::CacheError),

    /// Operation was cancelled
    #[error("Operation was cancelled")]
    Cancelled,
}

impl NetworkError {
    /// Returns true if a retry could plausibly change the outcome
    ///
    /// Transport failures and HTTP errors are retried; 4xx and 5xx are
    /// treated alike here, the split lives with the caller's policy.
    /// `NoConnection` and `DecodingFailed` are never retried since the
    /// result would not change.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NetworkError::RequestFailed(_) | NetworkError::HttpStatus(_)
        )
    }
}

// crates/offline/src/error.rs
//! Error types for offline mode handling

use thiserror::Error;

/// Result type for offline mode operations
pub type OfflineResult<T> = Result<T, OfflineError>;

/// Errors that can occur while managing offline mode
#[derive(Debug, Error)]
pub enum OfflineError {
    /// Cache storage error during hydration
    #[error("Cache storage error: {0}")]
    Storage(#[from] clipstream_cache::CacheError),

    /// A thread panicked while holding the handler lock
    #[error("Offline handler lock poisoned")]
    LockPoisoned,
}

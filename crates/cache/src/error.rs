//! Error types for cache storage

use std::path::PathBuf;
use thiserror::Error;

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Storage errors surfaced by the response cache
///
/// A missing key is not an error; these cover the storage medium itself.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Failed to read the cache file
    #[error("Failed to read cache file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to write the cache file
    #[error("Failed to write cache file {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Cache file contents could not be parsed
    #[error("Failed to parse cache file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Entries could not be serialized
    #[error("Failed to serialize cache entries: {0}")]
    SerializeError(serde_json::Error),

    /// Failed to create the cache directory
    #[error("Failed to create cache directory {path}: {source}")]
    DirectoryCreationError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No per-app data directory could be determined
    #[error("Could not determine an application data directory")]
    NoDataDirectory,

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// A thread panicked while holding the cache lock
    #[error("Cache lock poisoned")]
    LockPoisoned,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_display() {
        let err = CacheError::ReadError {
            path: PathBuf::from("/tmp/responses.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("responses.json"));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_no_data_directory_display() {
        let err = CacheError::NoDataDirectory;
        assert!(err.to_string().contains("data directory"));
    }
}

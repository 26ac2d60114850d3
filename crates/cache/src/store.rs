//! File-backed key/value store for response payloads
//!
//! The whole store lives in one JSON file under the per-app data directory.
//! Entries are loaded into memory on open and written back atomically on
//! every mutation, so the file is never left in a partial state.

use crate::error::{CacheError, CacheResult};
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;

const CACHE_FILE: &str = "responses.json";

/// One persisted response payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Key derived from endpoint path and call parameters
    pub key: String,
    /// Raw response body bytes
    pub payload: Vec<u8>,
    /// When this entry was stored
    pub stored_at: DateTime<Utc>,
}

/// Derives the cache key for an endpoint path and its ordered parameters
pub fn entry_key(path: &str, params: &[(String, String)]) -> String {
    if params.is_empty() {
        return path.to_string();
    }

    let query: Vec<String> = params.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    format!("{}?{}", path, query.join("&"))
}

/// Durable key/value storage of previously retrieved payloads
///
/// Writes are serialized by an interior lock; concurrent writers to the same
/// key are last-writer-wins. Readers never observe a partially written file
/// because persistence goes through an atomic rename.
pub struct ResponseCache {
    path: PathBuf,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    /// Opens the cache in the per-app data directory
    pub fn open_default() -> CacheResult<Self> {
        let dirs =
            ProjectDirs::from("com", "ClipStream", "ClipStream").ok_or(CacheError::NoDataDirectory)?;
        Self::open(dirs.data_dir().join(CACHE_FILE))
    }

    /// Opens a cache file, loading any existing entries
    ///
    /// A missing file yields an empty cache. An unreadable or unparseable
    /// file is an error, never silently discarded.
    pub fn open(path: PathBuf) -> CacheResult<Self> {
        let entries = Self::load_entries(&path)?;
        log::info!(
            "Response cache opened at {} ({} entries)",
            path.display(),
            entries.len()
        );

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    fn load_entries(path: &Path) -> CacheResult<HashMap<String, CacheEntry>> {
        if !path.exists() {
            return Ok(HashMap::new());
        }

        let contents = fs::read_to_string(path).map_err(|e| CacheError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        if contents.trim().is_empty() {
            return Err(CacheError::ReadError {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "Cache file is empty or contains only whitespace",
                ),
            });
        }

        let list: Vec<CacheEntry> =
            serde_json::from_str(&contents).map_err(|e| CacheError::ParseError {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(list.into_iter().map(|e| (e.key.clone(), e)).collect())
    }

    /// Stores a payload, overwriting any existing entry for `key`
    pub fn put(&self, key: impl Into<String>, payload: impl Into<Vec<u8>>) -> CacheResult<()> {
        let key = key.into();
        let entry = CacheEntry {
            key: key.clone(),
            payload: payload.into(),
            stored_at: Utc::now(),
        };

        {
            let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
            entries.insert(key, entry);
        }

        self.persist()
    }

    /// Returns the payload stored for `key`, or `None`
    pub fn get(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries.get(key).map(|e| e.payload.clone()))
    }

    /// Returns all entries, ordered by key
    pub fn list(&self) -> CacheResult<Vec<CacheEntry>> {
        let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
        let mut list: Vec<CacheEntry> = entries.values().cloned().collect();
        list.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(list)
    }

    /// Removes an entry, reporting whether it existed
    pub fn remove(&self, key: &str) -> CacheResult<bool> {
        let removed = {
            let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
            entries.remove(key).is_some()
        };

        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Removes every entry
    pub fn clear(&self) -> CacheResult<()> {
        {
            let mut entries = self.entries.write().map_err(|_| CacheError::LockPoisoned)?;
            entries.clear();
        }
        self.persist()
    }

    /// Number of stored entries
    pub fn len(&self) -> CacheResult<usize> {
        let entries = self.entries.read().map_err(|_| CacheError::LockPoisoned)?;
        Ok(entries.len())
    }

    /// True when the cache holds no entries
    pub fn is_empty(&self) -> CacheResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Writes the current entries to disk atomically
    fn persist(&self) -> CacheResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| CacheError::DirectoryCreationError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let list = self.list()?;
        let json = serde_json::to_string_pretty(&list).map_err(CacheError::SerializeError)?;

        let dir = self.path.parent().ok_or_else(|| {
            CacheError::WriteError {
                path: self.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "Cache path has no parent directory",
                ),
            }
        })?;

        let mut temp_file = NamedTempFile::new_in(dir).map_err(CacheError::IoError)?;
        temp_file.write_all(json.as_bytes()).map_err(CacheError::IoError)?;
        temp_file.flush().map_err(CacheError::IoError)?;
        temp_file.persist(&self.path).map_err(|e| CacheError::WriteError {
            path: self.path.clone(),
            source: e.error,
        })?;

        log::debug!("Persisted {} cache entries", list.len());
        Ok(())
    }
}

// crates/offline/src/handler.rs
//! Offline mode state machine

use crate::error::{OfflineError, OfflineResult};
use clipstream_cache::{CacheEntry, ResponseCache};
use clipstream_core::ConnectionState;
use clipstream_network::ConnectivityMonitor;
use serde::de::DeserializeOwned;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Where the application currently sources its content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentMode {
    /// Content comes from the network
    Online,
    /// Content comes from the response cache
    Offline,
}

/// Switches the content source to cached data while connectivity is lost
///
/// Subscribed to the connectivity monitor for the process lifetime. Entering
/// `Offline` hydrates the content view from every cache entry; returning to
/// `Online` clears it without forcing a refetch, the next explicit request
/// goes out over the network as usual.
///
/// `T` is the content record type; each cache payload is decoded as a JSON
/// list of `T`.
pub struct OfflineModeHandler<T> {
    cache: Arc<ResponseCache>,
    mode: Arc<Mutex<ContentMode>>,
    entries: Arc<Mutex<Vec<CacheEntry>>>,
    content: Arc<Mutex<Vec<T>>>,
    events: Mutex<Option<mpsc::UnboundedReceiver<ConnectionState>>>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<T> OfflineModeHandler<T>
where
    T: DeserializeOwned + Clone + Send + 'static,
{
    /// Creates a handler, deriving its initial mode from the monitor
    ///
    /// When constructed while disconnected the cache is hydrated
    /// immediately, so cached content is available before `start`.
    pub fn new(monitor: &ConnectivityMonitor, cache: Arc<ResponseCache>) -> OfflineResult<Self> {
        // Subscribe before the initial read so no transition slips between
        let events = monitor.subscribe();
        let initial = monitor.current_state();

        let (mode, entries, content) = if initial.is_connected {
            (ContentMode::Online, Vec::new(), Vec::new())
        } else {
            let (entries, content) = Self::hydrate(&cache)?;
            (ContentMode::Offline, entries, content)
        };

        Ok(Self {
            cache,
            mode: Arc::new(Mutex::new(mode)),
            entries: Arc::new(Mutex::new(entries)),
            content: Arc::new(Mutex::new(content)),
            events: Mutex::new(Some(events)),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        })
    }

    /// Begins processing connectivity transitions on a background task
    ///
    /// Calling `start` twice is a no-op.
    pub fn start(&self) {
        let mut rx = {
            let mut slot = match self.events.lock() {
                Ok(slot) => slot,
                Err(_) => return,
            };
            match slot.take() {
                Some(rx) => rx,
                None => {
                    log::warn!("Offline mode handler already started");
                    return;
                }
            }
        };

        let cache = Arc::clone(&self.cache);
        let mode = Arc::clone(&self.mode);
        let entries = Arc::clone(&self.entries);
        let content = Arc::clone(&self.content);
        let cancel = self.cancel.clone();

        let handle = tokio::spawn(async move {
            log::info!("Offline mode handler started");

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        log::info!("Offline mode handler stopping");
                        break;
                    }
                    event = rx.recv() => match event {
                        Some(state) => {
                            Self::apply_transition(state, &cache, &mode, &entries, &content);
                        }
                        None => {
                            log::warn!("Connectivity monitor went away");
                            break;
                        }
                    }
                }
            }
        });

        if let Ok(mut slot) = self.task.lock() {
            *slot = Some(handle);
        }
    }

    fn apply_transition(
        state: ConnectionState,
        cache: &ResponseCache,
        mode: &Mutex<ContentMode>,
        entries: &Mutex<Vec<CacheEntry>>,
        content: &Mutex<Vec<T>>,
    ) {
        let mut current = match mode.lock() {
            Ok(guard) => guard,
            Err(_) => return,
        };

        match (*current, state.is_connected) {
            (ContentMode::Online, false) => {
                *current = ContentMode::Offline;
                drop(current);

                log::info!("Connectivity lost, switching to cached content");
                match Self::hydrate(cache) {
                    Ok((loaded_entries, loaded_content)) => {
                        if let Ok(mut guard) = entries.lock() {
                            *guard = loaded_entries;
                        }
                        if let Ok(mut guard) = content.lock() {
                            *guard = loaded_content;
                        }
                    }
                    Err(e) => log::error!("Failed to hydrate offline content: {}", e),
                }
            }
            (ContentMode::Offline, true) => {
                *current = ContentMode::Online;
                drop(current);

                log::info!("Connectivity restored, content source back to network");
                if let Ok(mut guard) = entries.lock() {
                    guard.clear();
                }
                if let Ok(mut guard) = content.lock() {
                    guard.clear();
                }
            }
            // Repeated notification of the side we are already on
            _ => {}
        }
    }

    fn hydrate(cache: &ResponseCache) -> OfflineResult<(Vec<CacheEntry>, Vec<T>)> {
        let entries = cache.list()?;
        let mut content = Vec::new();

        for entry in &entries {
            match serde_json::from_slice::<Vec<T>>(&entry.payload) {
                Ok(items) => content.extend(items),
                Err(e) => log::warn!("Skipping undecodable cache entry {}: {}", entry.key, e),
            }
        }

        log::info!(
            "Hydrated {} content records from {} cache entries",
            content.len(),
            entries.len()
        );
        Ok((entries, content))
    }

    /// Current content source
    pub fn mode(&self) -> OfflineResult<ContentMode> {
        self.mode
            .lock()
            .map(|m| *m)
            .map_err(|_| OfflineError::LockPoisoned)
    }

    /// The cache entries backing the offline view, unmodified
    ///
    /// Empty while `Online`.
    pub fn cached_entries(&self) -> OfflineResult<Vec<CacheEntry>> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .map_err(|_| OfflineError::LockPoisoned)
    }

    /// The decoded offline content set
    ///
    /// Empty while `Online`.
    pub fn cached_content(&self) -> OfflineResult<Vec<T>> {
        self.content
            .lock()
            .map(|c| c.clone())
            .map_err(|_| OfflineError::LockPoisoned)
    }

    /// Stops the subscription task
    pub fn stop(&self) {
        self.cancel.cancel();
        if let Ok(mut slot) = self.task.lock() {
            slot.take();
        }
    }
}

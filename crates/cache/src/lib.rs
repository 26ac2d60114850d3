//! Persistent response cache for the ClipStream network layer
//!
//! Stores previously fetched response payloads keyed by endpoint and call
//! parameters, surviving process restarts. The offline mode handler hydrates
//! its content view from here when connectivity is lost.

mod error;
mod store;

pub use error::{CacheError, CacheResult};
pub use store::{entry_key, CacheEntry, ResponseCache};

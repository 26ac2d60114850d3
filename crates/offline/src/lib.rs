// crates/offline/src/lib.rs
//! Offline content mode for the ClipStream client
//!
//! Watches connectivity and switches the application's content source to the
//! response cache while the network is away.

mod error;
mod handler;

pub use error::{OfflineError, OfflineResult};
pub use handler::{ContentMode, OfflineModeHandler};

//! Connectivity state domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of network interface the device is currently using
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Wifi,
    Cellular,
    Ethernet,
    Unknown,
}

/// Snapshot of the device's network reachability at a point in time
///
/// Produced by the connectivity monitor on every path change and read by the
/// request executor and the offline mode handler. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionState {
    /// Active interface kind
    pub kind: ConnectionKind,
    /// Whether the network is reachable
    pub is_connected: bool,
    /// When this state was observed
    pub observed_at: DateTime<Utc>,
}

impl ConnectionState {
    /// Creates a state observed now
    pub fn new(kind: ConnectionKind, is_connected: bool) -> Self {
        Self {
            kind,
            is_connected,
            observed_at: Utc::now(),
        }
    }

    /// Connected state on the given interface kind
    pub fn connected(kind: ConnectionKind) -> Self {
        Self::new(kind, true)
    }

    /// Disconnected state with an unknown interface
    ///
    /// Used before the first observation and whenever the platform cannot
    /// report network state.
    pub fn offline() -> Self {
        Self::new(ConnectionKind::Unknown, false)
    }

    /// True when this state and `other` agree on reachability and interface
    ///
    /// Observation timestamps are ignored, so a monitor can decide whether a
    /// fresh sample is an actual transition.
    pub fn same_path(&self, other: &ConnectionState) -> bool {
        self.kind == other.kind && self.is_connected == other.is_connected
    }
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::offline()
    }
}

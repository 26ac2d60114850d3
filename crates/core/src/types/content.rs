//! Media content domain model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One media content record as returned by the content endpoint
///
/// Also the record shape persisted in the response cache and hydrated into
/// the offline content view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Stable identifier assigned by the backend
    pub id: String,
    /// Display title
    pub title: String,
    /// Optional longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Media duration in seconds, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<u64>,
    /// Last time the backend updated this record
    pub updated_at: DateTime<Utc>,
}

impl ContentItem {
    /// Creates a content item updated now
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            duration_secs: None,
            updated_at: Utc::now(),
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the duration
    pub fn with_duration_secs(mut self, secs: u64) -> Self {
        self.duration_secs = Some(secs);
        self
    }
}

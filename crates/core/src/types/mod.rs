//! Shared domain types for the ClipStream network layer

mod connection;
mod content;
mod endpoint;

pub use connection::{ConnectionKind, ConnectionState};
pub use content::ContentItem;
pub use endpoint::{Endpoint, EndpointDescriptor, HttpMethod};

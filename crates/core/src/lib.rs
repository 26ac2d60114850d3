pub mod types;

// Re-export commonly used types
pub use types::{
    ConnectionKind, ConnectionState, ContentItem, Endpoint, EndpointDescriptor, HttpMethod,
};

//! Logical API endpoints and their static descriptors

use serde::{Deserialize, Serialize};

/// HTTP methods used by the ClipStream API surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    /// Used by the connectivity probe, never by an endpoint descriptor
    Head,
    Post,
}

impl HttpMethod {
    /// Returns the wire name of the method
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
        }
    }
}

/// Static description of one logical API operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// Path relative to the API base address
    pub path: &'static str,
    /// HTTP method
    pub method: HttpMethod,
    /// Whether the request must carry a bearer token
    pub requires_auth: bool,
}

/// The logical APIs the client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Media content catalog
    Content,
    /// Analytics event batches
    Analytics,
    /// User data synchronization
    Sync,
    /// Application update checks
    Updates,
}

impl Endpoint {
    /// Returns the compile-time descriptor for this endpoint
    pub fn descriptor(&self) -> EndpointDescriptor {
        match self {
            Endpoint::Content => EndpointDescriptor {
                path: "/api/v1/content",
                method: HttpMethod::Get,
                requires_auth: true,
            },
            Endpoint::Analytics => EndpointDescriptor {
                path: "/api/v1/analytics",
                method: HttpMethod::Post,
                requires_auth: true,
            },
            Endpoint::Sync => EndpointDescriptor {
                path: "/api/v1/sync",
                method: HttpMethod::Post,
                requires_auth: true,
            },
            Endpoint::Updates => EndpointDescriptor {
                path: "/api/v1/updates",
                method: HttpMethod::Get,
                requires_auth: true,
            },
        }
    }

    /// All endpoints, in a stable order
    pub fn all() -> [Endpoint; 4] {
        [
            Endpoint::Content,
            Endpoint::Analytics,
            Endpoint::Sync,
            Endpoint::Updates,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_wire_names() {
        assert_eq!(HttpMethod::Get.as_str(), "GET");
        assert_eq!(HttpMethod::Post.as_str(), "POST");
    }

    #[test]
    fn test_content_descriptor() {
        let desc = Endpoint::Content.descriptor();
        assert_eq!(desc.path, "/api/v1/content");
        assert_eq!(desc.method, HttpMethod::Get);
        assert!(desc.requires_auth);
    }

    #[test]
    fn test_post_endpoints() {
        assert_eq!(Endpoint::Analytics.descriptor().method, HttpMethod::Post);
        assert_eq!(Endpoint::Sync.descriptor().method, HttpMethod::Post);
    }

    #[test]
    fn test_all_endpoints_require_auth() {
        for endpoint in Endpoint::all() {
            assert!(endpoint.descriptor().requires_auth);
        }
    }

    #[test]
    fn test_paths_are_distinct() {
        let paths: std::collections::HashSet<_> =
            Endpoint::all().iter().map(|e| e.descriptor().path).collect();
        assert_eq!(paths.len(), 4);
    }
}

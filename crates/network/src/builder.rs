// crates/network/src/builder.rs
//! Translates endpoint descriptors into request envelopes

use crate::envelope::RequestEnvelope;
use crate::error::{NetworkError, NetworkResult};
use bytes::Bytes;
use clipstream_core::Endpoint;
use reqwest::Url;

/// Deterministic request construction from an endpoint descriptor
///
/// Pure: `build` has no observable side effects and the builder holds no
/// interior mutability, so one instance is safe to share across concurrent
/// requests without synchronization.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: Url,
    client_id: String,
    auth_token: Option<String>,
}

impl RequestBuilder {
    /// Creates a builder for the given API base address
    pub fn new(base_url: &str, client_id: impl Into<String>) -> NetworkResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| NetworkError::InvalidEndpoint(format!("{}: {}", base_url, e)))?;

        Ok(Self {
            base_url,
            client_id: client_id.into(),
            auth_token: None,
        })
    }

    /// Sets the bearer token attached to auth-requiring endpoints
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Builds the envelope for one endpoint call
    ///
    /// Query parameters are appended in the order given. The three fixed
    /// headers are always present: bearer authorization (when the descriptor
    /// requires it), accept type, and the client identifier.
    pub fn build(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
        body: Option<Bytes>,
    ) -> NetworkResult<RequestEnvelope> {
        let descriptor = endpoint.descriptor();

        let mut url = self.base_url.join(descriptor.path).map_err(|e| {
            NetworkError::InvalidEndpoint(format!("{} + {}: {}", self.base_url, descriptor.path, e))
        })?;

        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
        }

        let mut headers = Vec::with_capacity(4);

        if descriptor.requires_auth {
            let token = self
                .auth_token
                .as_deref()
                .ok_or_else(|| NetworkError::MissingAuthToken(descriptor.path.to_string()))?;
            headers.push(("Authorization".to_string(), format!("Bearer {}", token)));
        }

        headers.push(("Accept".to_string(), "application/json".to_string()));
        headers.push(("X-Client-Id".to_string(), self.client_id.clone()));

        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        Ok(RequestEnvelope {
            url: url.into(),
            method: descriptor.method,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipstream_core::HttpMethod;

    fn builder() -> RequestBuilder {
        RequestBuilder::new("https://api.clipstream.example", "client-abc")
            .expect("Failed to create builder")
            .with_auth_token("secret-token")
    }

    #[test]
    fn test_invalid_base_address() {
        let result = RequestBuilder::new("not a url", "client-abc");
        assert!(matches!(result, Err(NetworkError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_content_envelope() {
        let envelope = builder()
            .build(Endpoint::Content, &[], None)
            .expect("build");

        assert_eq!(
            envelope.url,
            "https://api.clipstream.example/api/v1/content"
        );
        assert_eq!(envelope.method, HttpMethod::Get);
        assert!(envelope.body.is_none());
    }

    #[test]
    fn test_fixed_headers_present_in_order() {
        let envelope = builder()
            .build(Endpoint::Content, &[], None)
            .expect("build");

        assert_eq!(envelope.headers[0].0, "Authorization");
        assert_eq!(envelope.headers[0].1, "Bearer secret-token");
        assert_eq!(envelope.header("Accept"), Some("application/json"));
        assert_eq!(envelope.header("X-Client-Id"), Some("client-abc"));
    }

    #[test]
    fn test_query_params_appended_in_order() {
        let params = vec![
            ("genre".to_string(), "jazz".to_string()),
            ("page".to_string(), "2".to_string()),
        ];
        let envelope = builder()
            .build(Endpoint::Content, &params, None)
            .expect("build");

        assert!(envelope.url.ends_with("/api/v1/content?genre=jazz&page=2"));
    }

    #[test]
    fn test_post_body_sets_content_type() {
        let body = Bytes::from_static(b"{\"events\":[]}");
        let envelope = builder()
            .build(Endpoint::Analytics, &[], Some(body.clone()))
            .expect("build");

        assert_eq!(envelope.method, HttpMethod::Post);
        assert_eq!(envelope.header("Content-Type"), Some("application/json"));
        assert_eq!(envelope.body, Some(body));
    }

    #[test]
    fn test_missing_token_on_auth_endpoint() {
        let no_token = RequestBuilder::new("https://api.clipstream.example", "client-abc")
            .expect("Failed to create builder");

        let result = no_token.build(Endpoint::Sync, &[], None);
        assert!(matches!(result, Err(NetworkError::MissingAuthToken(_))));
    }

    #[test]
    fn test_build_is_repeatable() {
        let b = builder();
        let first = b.build(Endpoint::Updates, &[], None).expect("build");
        let second = b.build(Endpoint::Updates, &[], None).expect("build");

        assert_eq!(first.url, second.url);
        assert_eq!(first.headers, second.headers);
    }
}

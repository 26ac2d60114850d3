// crates/network/src/transport.rs
//! Transport seam and its reqwest-backed implementation

use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::error::{NetworkError, NetworkResult};
use async_trait::async_trait;
use clipstream_core::HttpMethod;
use std::time::Duration;

/// Sends one request envelope and returns the raw response
///
/// The seam the executor talks through, so tests can substitute a scripted
/// transport and count the calls that actually go out.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, envelope: &RequestEnvelope) -> NetworkResult<ResponseEnvelope>;
}

/// HTTP transport configuration
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Maximum redirects to follow
    pub max_redirects: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: format!("ClipStream/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

/// Production transport over a shared reqwest client
#[derive(Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with default configuration
    pub fn new() -> NetworkResult<Self> {
        Self::with_config(TransportConfig::default())
    }

    /// Creates a transport with custom configuration
    pub fn with_config(config: TransportConfig) -> NetworkResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| NetworkError::RequestFailed(e.to_string()))?;

        Ok(Self { inner: client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, envelope: &RequestEnvelope) -> NetworkResult<ResponseEnvelope> {
        let method = match envelope.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut request = self.inner.request(method, &envelope.url);
        for (name, value) in &envelope.headers {
            request = request.header(name, value);
        }
        if let Some(body) = &envelope.body {
            request = request.body(body.clone());
        }

        let response = request.send().await.map_err(classify_send_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();

        // Status and headers arrived; a failure reading the body means the
        // payload was not a well-formed HTTP message
        let body = response
            .bytes()
            .await
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))?;

        Ok(ResponseEnvelope {
            status,
            headers,
            body,
        })
    }
}

fn classify_send_error(e: reqwest::Error) -> NetworkError {
    if e.is_builder() {
        NetworkError::InvalidEndpoint(e.to_string())
    } else if e.is_decode() {
        NetworkError::InvalidResponse(e.to_string())
    } else {
        NetworkError::RequestFailed(e.to_string())
    }
}

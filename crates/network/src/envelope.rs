// crates/network/src/envelope.rs
//! Request and response envelopes

use crate::error::{NetworkError, NetworkResult};
use bytes::Bytes;
use clipstream_core::HttpMethod;
use serde::de::DeserializeOwned;

/// A fully-formed request, built once per attempt
///
/// Envelopes are never mutated after construction; a retry re-derives a
/// fresh one from the builder.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    /// Absolute request URL
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Headers in the order they are sent
    pub headers: Vec<(String, String)>,
    /// Optional pre-encoded body
    pub body: Option<Bytes>,
}

impl RequestEnvelope {
    /// Looks up a header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// One attempt's response, consumed immediately
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Raw body bytes
    pub body: Bytes,
}

impl ResponseEnvelope {
    /// True for status codes in the 200-299 range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON into the expected shape
    ///
    /// A parse failure is [`NetworkError::DecodingFailed`]; retrying would
    /// produce the same malformed payload, so callers must not retry it.
    pub fn decode<T: DeserializeOwned>(&self) -> NetworkResult<T> {
        serde_json::from_slice(&self.body).map_err(NetworkError::DecodingFailed)
    }
}

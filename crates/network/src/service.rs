// crates/network/src/service.rs
//! Descriptor-driven fetch pipeline with retry and write-through caching

use crate::builder::RequestBuilder;
use crate::error::{NetworkError, NetworkResult};
use crate::executor::RequestExecutor;
use bytes::Bytes;
use clipstream_cache::{entry_key, ResponseCache};
use clipstream_core::Endpoint;
use clipstream_resilience::{retry_if_cancellable, RetryError, RetryPolicy};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// High-level network access for the logical API endpoints
///
/// All collaborators are injected: request construction, execution,
/// retry policy, and the optional response cache. The content record type is
/// a parameter on each call, so one service instance covers every endpoint.
pub struct NetworkService {
    builder: RequestBuilder,
    executor: RequestExecutor,
    retry_policy: RetryPolicy,
    cache: Option<Arc<ResponseCache>>,
    cancel: CancellationToken,
}

impl NetworkService {
    /// Creates a service with the default retry policy and no cache
    pub fn new(builder: RequestBuilder, executor: RequestExecutor) -> Self {
        Self {
            builder,
            executor,
            retry_policy: RetryPolicy::default(),
            cache: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the retry policy
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    /// Enables write-through caching of successful responses
    pub fn with_cache(mut self, cache: Arc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attaches a cancellation token threaded through retries
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Fetches and decodes a GET endpoint
    pub async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
    ) -> NetworkResult<T> {
        self.request(endpoint, params, None).await
    }

    /// Sends a pre-encoded body to a POST endpoint and decodes the reply
    pub async fn post<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
        body: Bytes,
    ) -> NetworkResult<T> {
        self.request(endpoint, params, Some(body)).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        params: &[(String, String)],
        body: Option<Bytes>,
    ) -> NetworkResult<T> {
        let builder = &self.builder;
        let executor = &self.executor;

        let attempt = || {
            // The envelope is re-derived for every attempt, never reused
            let body = body.clone();
            async move {
                let envelope = builder.build(endpoint, params, body)?;
                executor.execute(&envelope).await
            }
        };

        let result = retry_if_cancellable(
            &self.retry_policy,
            &self.cancel,
            attempt,
            NetworkError::is_retryable,
        )
        .await;

        let response = match result {
            Ok(response) => response,
            Err(RetryError::Cancelled) => return Err(NetworkError::Cancelled),
            Err(RetryError::Operation(e)) => return Err(e),
        };

        // Decode failures sit outside the retry loop: the payload would be
        // just as malformed on the next attempt
        let value = response.decode::<T>()?;

        if let Some(cache) = &self.cache {
            let key = entry_key(endpoint.descriptor().path, params);
            if let Err(e) = cache.put(key, response.body.to_vec()) {
                // A failed cache write must not fail the fetch
                log::warn!(
                    "Failed to cache response for {}: {}",
                    endpoint.descriptor().path,
                    e
                );
            }
        }

        Ok(value)
    }
}

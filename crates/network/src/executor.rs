// crates/network/src/executor.rs
//! Single-attempt request execution and outcome classification

use crate::envelope::{RequestEnvelope, ResponseEnvelope};
use crate::error::{NetworkError, NetworkResult};
use crate::transport::Transport;
use clipstream_core::ConnectionState;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Performs one attempt of a network call and classifies the outcome
///
/// Callers are expected to check connectivity before calling; the executor
/// re-checks anyway to close the race between check and call, so a
/// disconnected path never sends bytes.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    connectivity: watch::Receiver<ConnectionState>,
    cancel: CancellationToken,
}

impl RequestExecutor {
    /// Creates an executor over the given transport and connectivity view
    pub fn new(
        transport: Arc<dyn Transport>,
        connectivity: watch::Receiver<ConnectionState>,
    ) -> Self {
        Self {
            transport,
            connectivity,
            cancel: CancellationToken::new(),
        }
    }

    /// Attaches a cancellation token checked before each dispatch
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Latest connectivity reading
    pub fn is_connected(&self) -> bool {
        self.connectivity.borrow().is_connected
    }

    /// Executes one attempt
    ///
    /// Success is a status in the 200-299 range; any other status comes back
    /// as [`NetworkError::HttpStatus`] with the code preserved verbatim. No
    /// distinction is made between 4xx and 5xx here.
    pub async fn execute(&self, envelope: &RequestEnvelope) -> NetworkResult<ResponseEnvelope> {
        if self.cancel.is_cancelled() {
            return Err(NetworkError::Cancelled);
        }

        if !self.is_connected() {
            log::debug!("Refusing {} while disconnected", envelope.url);
            return Err(NetworkError::NoConnection);
        }

        let response = self.transport.send(envelope).await?;

        if response.is_success() {
            Ok(response)
        } else {
            Err(NetworkError::HttpStatus(response.status))
        }
    }
}

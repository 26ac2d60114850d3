// crates/network/src/monitor.rs
//! Network path observation and change notification

use crate::envelope::RequestEnvelope;
use crate::transport::Transport;
use async_trait::async_trait;
use clipstream_core::{ConnectionKind, ConnectionState, HttpMethod};
use clipstream_resilience::with_timeout;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Samples the device's current network path
#[async_trait]
pub trait PathProbe: Send + Sync {
    async fn sample(&self) -> ConnectionState;
}

/// Reachability probe that issues HEAD requests to well-known URLs
///
/// The first URL that answers at all marks the network reachable. The
/// interface kind is reported as `Unknown` since an HTTP probe cannot see
/// it; platform integrations push real interface data through
/// [`ManualProbe`] instead.
pub struct HttpProbe {
    transport: Arc<dyn Transport>,
    check_urls: Vec<String>,
    check_timeout: Duration,
}

impl HttpProbe {
    /// Creates a probe with default check URLs
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            check_urls: vec![
                "https://www.google.com".to_string(),
                "https://www.cloudflare.com".to_string(),
                "https://www.rust-lang.org".to_string(),
            ],
            check_timeout: Duration::from_secs(3),
        }
    }

    /// Creates a probe with custom check URLs
    pub fn with_urls(transport: Arc<dyn Transport>, urls: Vec<String>) -> Self {
        Self {
            check_urls: urls,
            ..Self::new(transport)
        }
    }

    /// Sets the per-URL answer deadline
    pub fn with_check_timeout(mut self, timeout: Duration) -> Self {
        self.check_timeout = timeout;
        self
    }
}

#[async_trait]
impl PathProbe for HttpProbe {
    async fn sample(&self) -> ConnectionState {
        for url in &self.check_urls {
            let envelope = RequestEnvelope {
                url: url.clone(),
                method: HttpMethod::Head,
                headers: Vec::new(),
                body: None,
            };

            // Any HTTP answer at all means the network is reachable
            if let Ok(Ok(_)) = with_timeout(self.check_timeout, self.transport.send(&envelope)).await
            {
                return ConnectionState::connected(ConnectionKind::Unknown);
            }
        }

        ConnectionState::offline()
    }
}

/// Probe driven by hand
///
/// Lets a platform integration push interface changes from OS callbacks, and
/// lets tests script connectivity transitions.
#[derive(Clone)]
pub struct ManualProbe {
    state: Arc<Mutex<ConnectionState>>,
}

impl ManualProbe {
    /// Creates a probe reporting the given state until changed
    pub fn new(initial: ConnectionState) -> Self {
        Self {
            state: Arc::new(Mutex::new(initial)),
        }
    }

    /// Updates the state the probe reports
    pub fn set(&self, state: ConnectionState) {
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
    }
}

#[async_trait]
impl PathProbe for ManualProbe {
    async fn sample(&self) -> ConnectionState {
        self.state
            .lock()
            .map(|s| *s)
            .unwrap_or_else(|_| ConnectionState::offline())
    }
}

/// Connectivity monitor configuration
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Interval between path samples
    pub interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
        }
    }
}

/// Observes the network path and publishes every state transition
///
/// One long-lived background task samples the probe; subscribers each get
/// their own ordered stream of transitions. The monitor runs until `stop`
/// cancels the observation task.
pub struct ConnectivityMonitor {
    probe: Arc<dyn PathProbe>,
    config: MonitorConfig,
    state_tx: Arc<watch::Sender<ConnectionState>>,
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<ConnectionState>>>>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectivityMonitor {
    /// Creates a monitor with the default sampling interval
    pub fn new(probe: Arc<dyn PathProbe>) -> Self {
        Self::with_config(probe, MonitorConfig::default())
    }

    /// Creates a monitor with custom configuration
    pub fn with_config(probe: Arc<dyn PathProbe>, config: MonitorConfig) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::offline());

        Self {
            probe,
            config,
            state_tx: Arc::new(state_tx),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            cancel: CancellationToken::new(),
            task: Mutex::new(None),
        }
    }

    /// Begins observation on a background task
    ///
    /// The probe is sampled immediately, then on every interval tick. Calling
    /// `start` twice is a no-op.
    pub fn start(&self) {
        let mut slot = match self.task.lock() {
            Ok(slot) => slot,
            Err(_) => return,
        };
        if slot.is_some() {
            log::warn!("Connectivity monitor already started");
            return;
        }

        let probe = Arc::clone(&self.probe);
        let state_tx = Arc::clone(&self.state_tx);
        let subscribers = Arc::clone(&self.subscribers);
        let cancel = self.cancel.clone();
        let interval = self.config.interval;

        let handle = tokio::spawn(async move {
            log::info!("Connectivity monitor started");
            let mut last = *state_tx.borrow();

            loop {
                if cancel.is_cancelled() {
                    break;
                }

                let state = probe.sample().await;

                if !state.same_path(&last) {
                    log::info!(
                        "Connectivity changed: connected={} kind={:?}",
                        state.is_connected,
                        state.kind
                    );
                    state_tx.send_replace(state);
                    if let Ok(mut subs) = subscribers.lock() {
                        subs.retain(|tx| tx.send(state).is_ok());
                    }
                    last = state;
                }

                tokio::select! {
                    _ = cancel.cancelled() => {
                        log::info!("Connectivity monitor stopping");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        });

        *slot = Some(handle);
    }

    /// Returns the latest known connection state
    pub fn current_state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Returns a live view of the connection state for fail-fast checks
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Registers a subscriber
    ///
    /// The returned stream carries every transition after this call, in the
    /// order the path changes occurred.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<ConnectionState> {
        let (tx, rx) = mpsc::unbounded_channel();
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push(tx);
        }
        rx
    }

    /// Stops the observation task
    pub fn stop(&self) {
        self.cancel.cancel();
        if let Ok(mut slot) = self.task.lock() {
            slot.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wifi() -> ConnectionState {
        ConnectionState::connected(ConnectionKind::Wifi)
    }

    #[test]
    fn test_monitor_initial_state_is_offline() {
        let probe = Arc::new(ManualProbe::new(wifi()));
        let monitor = ConnectivityMonitor::new(probe);
        assert!(!monitor.current_state().is_connected);
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_publishes_transitions_in_order() {
        let probe = Arc::new(ManualProbe::new(wifi()));
        let monitor = ConnectivityMonitor::with_config(
            Arc::clone(&probe) as Arc<dyn PathProbe>,
            MonitorConfig {
                interval: Duration::from_millis(10),
            },
        );

        let mut events = monitor.subscribe();
        monitor.start();

        let first = events.recv().await.expect("first transition");
        assert!(first.is_connected);

        probe.set(ConnectionState::offline());
        let second = events.recv().await.expect("second transition");
        assert!(!second.is_connected);

        probe.set(wifi());
        let third = events.recv().await.expect("third transition");
        assert!(third.is_connected);

        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_unchanged_path_is_not_republished() {
        let probe = Arc::new(ManualProbe::new(wifi()));
        let monitor = ConnectivityMonitor::with_config(
            Arc::clone(&probe) as Arc<dyn PathProbe>,
            MonitorConfig {
                interval: Duration::from_millis(10),
            },
        );

        let mut events = monitor.subscribe();
        monitor.start();

        events.recv().await.expect("initial transition");

        // Several more samples of the same state produce nothing
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(events.try_recv().is_err());

        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_state_tracks_probe() {
        let probe = Arc::new(ManualProbe::new(ConnectionState::offline()));
        let monitor = ConnectivityMonitor::with_config(
            Arc::clone(&probe) as Arc<dyn PathProbe>,
            MonitorConfig {
                interval: Duration::from_millis(10),
            },
        );

        monitor.start();
        probe.set(ConnectionState::connected(ConnectionKind::Cellular));
        tokio::time::sleep(Duration::from_millis(50)).await;

        let state = monitor.current_state();
        assert!(state.is_connected);
        assert_eq!(state.kind, ConnectionKind::Cellular);

        monitor.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_observation() {
        let probe = Arc::new(ManualProbe::new(ConnectionState::offline()));
        let monitor = ConnectivityMonitor::with_config(
            Arc::clone(&probe) as Arc<dyn PathProbe>,
            MonitorConfig {
                interval: Duration::from_millis(10),
            },
        );

        let mut events = monitor.subscribe();
        monitor.start();
        monitor.stop();

        // A change after stop is never delivered
        tokio::time::sleep(Duration::from_millis(100)).await;
        probe.set(wifi());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_manual_probe_sample() {
        let probe = ManualProbe::new(wifi());
        assert!(probe.sample().await.is_connected);

        probe.set(ConnectionState::offline());
        assert!(!probe.sample().await.is_connected);
    }
}

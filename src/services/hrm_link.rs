//! Heart-rate monitor connection lifecycle

use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::Serialize;
use tokio::{
    sync::{mpsc, watch},
    time::{sleep, timeout},
};
use tracing::{debug, error, info, warn};

use crate::{
    error::LinkError,
    state::WorkoutEvent,
};

use super::transport::{
    parse_bpm, HrmTransport, Notifications, HEART_RATE_MEASUREMENT, HEART_RATE_SERVICE,
};

/// Name advertised by the chest strap the workout pairs with
pub const DEFAULT_DEVICE_NAME: &str = "HRM-Dual:992416";

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// How failed attempts are rescheduled
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub delay: Duration,
    /// Multiplier applied to the delay after each failure; 1.0 keeps it fixed
    pub backoff_factor: f64,
    pub max_delay: Duration,
    /// Consecutive retries allowed before giving up; `None` retries forever
    pub max_retries: Option<u32>,
}

impl RetryPolicy {
    /// Delay to use after `current`, never above the cap
    pub fn next_delay(&self, current: Duration) -> Duration {
        let cap = self.max_delay.max(self.delay);
        let grown = current.as_secs_f64() * self.backoff_factor.max(1.0);
        Duration::try_from_secs_f64(grown).map_or(cap, |delay| delay.min(cap))
    }

    /// Whether another retry is allowed after `failures` consecutive failures
    pub fn allows_retry(&self, failures: u32) -> bool {
        self.max_retries.map_or(true, |max| failures <= max)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1000),
            backoff_factor: 1.0,
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

/// Link settings
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    pub device_name: String,
    pub scan_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            device_name: DEFAULT_DEVICE_NAME.to_string(),
            scan_timeout: Duration::from_millis(4000),
            retry: RetryPolicy::default(),
        }
    }
}

/// Diagnostic snapshot of the link
#[derive(Debug, Clone, Serialize)]
pub struct LinkStatus {
    pub state: ConnectionState,
    /// Id of the current or most recent attempt
    pub attempt: u64,
    pub consecutive_failures: u32,
    pub next_retry_ms: Option<u64>,
    pub last_error: Option<String>,
    pub connected_since: Option<DateTime<Utc>>,
}

impl LinkStatus {
    fn new() -> Self {
        Self {
            state: ConnectionState::Disconnected,
            attempt: 0,
            consecutive_failures: 0,
            next_retry_ms: None,
            last_error: None,
            connected_since: None,
        }
    }
}

/// Keeps a heart-rate monitor connected and publishes its readings.
///
/// Attempts run one after another inside `run`, so two connection sequences
/// can never be in flight at once.
pub struct HeartRateMonitorLink<T> {
    transport: T,
    config: LinkConfig,
    events: mpsc::UnboundedSender<WorkoutEvent>,
    bpm_tx: watch::Sender<Option<u8>>,
    status_tx: watch::Sender<LinkStatus>,
}

impl<T: HrmTransport> HeartRateMonitorLink<T> {
    pub fn new(transport: T, config: LinkConfig, events: mpsc::UnboundedSender<WorkoutEvent>) -> Self {
        let (bpm_tx, _) = watch::channel(None);
        let (status_tx, _) = watch::channel(LinkStatus::new());

        Self {
            transport,
            config,
            events,
            bpm_tx,
            status_tx,
        }
    }

    /// Latest BPM reading, `None` until the first notification
    pub fn subscribe_bpm(&self) -> watch::Receiver<Option<u8>> {
        self.bpm_tx.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<LinkStatus> {
        self.status_tx.subscribe()
    }

    /// Connect, stream readings, and reconnect on any failure.
    ///
    /// Returns `Ok` once the event receiver is gone, or `RetriesExhausted`
    /// when the retry policy runs out.
    pub async fn run(&mut self) -> Result<(), LinkError> {
        info!(
            "Starting heart-rate link for {} (scan timeout {:?})",
            self.config.device_name, self.config.scan_timeout
        );

        let mut failures: u32 = 0;
        let mut delay = self.config.retry.delay;
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            self.status_tx.send_modify(|status| {
                status.state = ConnectionState::Connecting;
                status.attempt = attempt;
                status.next_retry_ms = None;
            });
            debug!("Heart-rate link attempt {}", attempt);

            let error = match self.connect_once().await {
                Ok(notifications) => {
                    failures = 0;
                    delay = self.config.retry.delay;
                    self.status_tx.send_modify(|status| {
                        status.state = ConnectionState::Connected;
                        status.consecutive_failures = 0;
                        status.last_error = None;
                        status.connected_since = Some(Utc::now());
                    });
                    info!("Heart-rate link connected on attempt {}", attempt);

                    if self.events.send(WorkoutEvent::LinkConnected { attempt }).is_err() {
                        debug!("Event loop closed, stopping heart-rate link");
                        return Ok(());
                    }
                    self.stream_readings(notifications).await
                }
                Err(e) => e,
            };

            self.transport.disconnect().await;
            failures = failures.saturating_add(1);
            let retrying = self.config.retry.allows_retry(failures);

            warn!(
                "Heart-rate link attempt {} failed: {}{}",
                attempt,
                error,
                if retrying { format!(", retrying in {:?}", delay) } else { String::new() }
            );
            self.status_tx.send_modify(|status| {
                status.state = ConnectionState::Disconnected;
                status.consecutive_failures = failures;
                status.last_error = Some(error.to_string());
                status.connected_since = None;
                status.next_retry_ms = retrying.then(|| delay.as_millis() as u64);
            });

            if self
                .events
                .send(WorkoutEvent::LinkLost { attempt, error })
                .is_err()
            {
                debug!("Event loop closed, stopping heart-rate link");
                return Ok(());
            }

            if !retrying {
                error!("Heart-rate link giving up after {} failed attempts", failures);
                let _ = self.events.send(WorkoutEvent::LinkGaveUp { attempts: failures });
                return Err(LinkError::RetriesExhausted { attempts: failures });
            }

            sleep(delay).await;
            delay = self.config.retry.next_delay(delay);
        }
    }

    /// One pass through scan, connect, discovery and subscription
    async fn connect_once(&mut self) -> Result<Notifications, LinkError> {
        let name = self.config.device_name.as_str();
        let scan_timeout = self.config.scan_timeout;

        let peripheral = timeout(scan_timeout, self.transport.scan(name))
            .await
            .map_err(|_| LinkError::ScanTimeout {
                name: name.to_string(),
                timeout: scan_timeout,
            })??;
        debug!("Found {} at {}", peripheral.name, peripheral.address);

        self.transport.connect(&peripheral).await?;
        self.transport.discover_service(HEART_RATE_SERVICE).await?;
        self.transport
            .discover_characteristic(HEART_RATE_MEASUREMENT)
            .await?;
        self.transport.subscribe().await
    }

    /// Publish readings until the notification stream ends
    async fn stream_readings(&mut self, mut notifications: Notifications) -> LinkError {
        while let Some(payload) = notifications.next().await {
            match parse_bpm(&payload) {
                Some(bpm) => {
                    debug!("Heart-rate reading: {} bpm", bpm);
                    self.bpm_tx.send_replace(Some(bpm));
                }
                None => warn!("Ignoring short heart-rate notification: {:?}", payload),
            }
        }
        LinkError::Disconnected
    }
}

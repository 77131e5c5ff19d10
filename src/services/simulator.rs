//! Simulated heart-rate strap for running without hardware

use std::time::Duration;

use futures::{
    future::{self, BoxFuture},
    stream, FutureExt, StreamExt,
};
use tokio::{sync::mpsc, task::JoinHandle, time::interval};
use tracing::{debug, info};

use crate::error::LinkError;

use super::transport::{HrmTransport, Notifications, Peripheral};

/// Simulator knobs
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Scans that fail before the strap shows up
    pub failures_before_connect: u32,
    /// Drop the link after this many notifications
    pub drop_after: Option<u32>,
    pub base_bpm: u8,
    pub notify_interval: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            failures_before_connect: 0,
            drop_after: None,
            base_bpm: 130,
            notify_interval: Duration::from_secs(1),
        }
    }
}

/// Transport that fakes a heart-rate strap advertising any requested name
#[derive(Debug)]
pub struct SimulatedTransport {
    config: SimulatorConfig,
    scans: u32,
    connected: bool,
    feed: Option<JoinHandle<()>>,
}

impl SimulatedTransport {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            scans: 0,
            connected: false,
            feed: None,
        }
    }

    /// Spawn the notification feed. BPM drifts in a slow sawtooth around the base.
    fn start_feed(&mut self) -> Notifications {
        let (tx, rx) = mpsc::channel::<Vec<u8>>(8);
        let base = self.config.base_bpm;
        let period = self.config.notify_interval;
        let drop_after = self.config.drop_after;

        self.feed = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            let mut sent: u32 = 0;
            loop {
                ticker.tick().await;
                if drop_after.map_or(false, |limit| sent >= limit) {
                    info!("Simulated strap dropping link after {} readings", sent);
                    break;
                }
                let drift = (sent % 20) as u8;
                let bpm = base.saturating_sub(10).saturating_add(drift);
                // Flags byte, then an 8-bit BPM
                if tx.send(vec![0x00, bpm]).await.is_err() {
                    break;
                }
                sent += 1;
            }
        }));

        stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|payload| (payload, rx)) })
            .boxed()
    }
}

impl HrmTransport for SimulatedTransport {
    fn scan<'a>(&'a mut self, name: &'a str) -> BoxFuture<'a, Result<Peripheral, LinkError>> {
        self.scans += 1;
        let fail = self.scans <= self.config.failures_before_connect;
        async move {
            // Radio time
            tokio::time::sleep(Duration::from_millis(200)).await;
            if fail {
                return Err(LinkError::Transport("simulated scan failure".to_string()));
            }
            Ok(Peripheral {
                name: name.to_string(),
                address: "sim:00:00:00:00:01".to_string(),
            })
        }
        .boxed()
    }

    fn connect<'a>(&'a mut self, peripheral: &'a Peripheral) -> BoxFuture<'a, Result<(), LinkError>> {
        debug!("Simulated connect to {}", peripheral.address);
        self.connected = true;
        future::ready(Ok(())).boxed()
    }

    fn discover_service(&mut self, uuid: u16) -> BoxFuture<'_, Result<(), LinkError>> {
        let result = if self.connected {
            Ok(())
        } else {
            Err(LinkError::Discovery {
                what: format!("service {:04x}", uuid),
                reason: "not connected".to_string(),
            })
        };
        future::ready(result).boxed()
    }

    fn discover_characteristic(&mut self, uuid: u16) -> BoxFuture<'_, Result<(), LinkError>> {
        let result = if self.connected {
            Ok(())
        } else {
            Err(LinkError::Discovery {
                what: format!("characteristic {:04x}", uuid),
                reason: "not connected".to_string(),
            })
        };
        future::ready(result).boxed()
    }

    fn subscribe(&mut self) -> BoxFuture<'_, Result<Notifications, LinkError>> {
        let notifications = self.start_feed();
        future::ready(Ok(notifications)).boxed()
    }

    fn disconnect(&mut self) -> BoxFuture<'_, ()> {
        if let Some(feed) = self.feed.take() {
            feed.abort();
        }
        self.connected = false;
        future::ready(()).boxed()
    }
}

impl Drop for SimulatedTransport {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.take() {
            feed.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fails_configured_scans_then_streams() {
        let mut transport = SimulatedTransport::new(SimulatorConfig {
            failures_before_connect: 1,
            drop_after: Some(2),
            ..SimulatorConfig::default()
        });

        assert!(transport.scan("HRM").await.is_err());
        let peripheral = transport.scan("HRM").await.unwrap();
        assert_eq!(peripheral.name, "HRM");

        transport.connect(&peripheral).await.unwrap();
        transport.discover_service(0x180D).await.unwrap();
        transport.discover_characteristic(0x2A37).await.unwrap();
        let payloads: Vec<Vec<u8>> = transport.subscribe().await.unwrap().collect().await;

        assert_eq!(payloads, vec![vec![0x00, 120], vec![0x00, 121]]);
    }

    #[tokio::test]
    async fn discovery_requires_connection() {
        let mut transport = SimulatedTransport::new(SimulatorConfig::default());
        assert!(transport.discover_service(0x180D).await.is_err());
    }
}

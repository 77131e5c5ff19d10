//! Peripheral transport contract for the heart-rate monitor

use futures::{future::BoxFuture, stream::BoxStream};

use crate::error::LinkError;

/// Standard heart-rate service
pub const HEART_RATE_SERVICE: u16 = 0x180D;
/// Heart-rate measurement characteristic
pub const HEART_RATE_MEASUREMENT: u16 = 0x2A37;

/// Byte offset of the BPM value in a measurement notification
const BPM_OFFSET: usize = 1;

/// Notification payloads. The stream ends when the peripheral disconnects.
pub type Notifications = BoxStream<'static, Vec<u8>>;

/// A peripheral found by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peripheral {
    pub name: String,
    pub address: String,
}

/// Peripheral bus operations needed to reach a heart-rate monitor.
///
/// Methods return boxed futures so a link over any transport can be moved
/// into a spawned task. Scan timeouts are enforced by the caller.
pub trait HrmTransport: Send {
    /// Find a peripheral advertising exactly `name`
    fn scan<'a>(&'a mut self, name: &'a str) -> BoxFuture<'a, Result<Peripheral, LinkError>>;

    fn connect<'a>(&'a mut self, peripheral: &'a Peripheral) -> BoxFuture<'a, Result<(), LinkError>>;

    fn discover_service(&mut self, uuid: u16) -> BoxFuture<'_, Result<(), LinkError>>;

    fn discover_characteristic(&mut self, uuid: u16) -> BoxFuture<'_, Result<(), LinkError>>;

    /// Enable notifications on the discovered characteristic
    fn subscribe(&mut self) -> BoxFuture<'_, Result<Notifications, LinkError>>;

    /// Release whatever the last attempt left open
    fn disconnect(&mut self) -> BoxFuture<'_, ()>;
}

/// Extract the BPM from a measurement notification
pub fn parse_bpm(payload: &[u8]) -> Option<u8> {
    payload.get(BPM_OFFSET).copied()
}

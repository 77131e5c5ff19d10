//! External collaborator module
//! 
//! This module contains the contracts the workout needs from the device
//! (display, haptics, peripheral transport), the heart-rate link built on the
//! transport, and console/simulated implementations for running on a host.

pub mod display;
pub mod haptics;
pub mod hrm_link;
pub mod simulator;
pub mod transport;

// Re-export main types
pub use display::{Button, ConsoleDisplay, DisplayAdapter, Field, FieldId};
pub use haptics::{ConsoleHaptics, Haptics};
pub use hrm_link::{ConnectionState, HeartRateMonitorLink, LinkConfig, LinkStatus, RetryPolicy};
pub use simulator::{SimulatedTransport, SimulatorConfig};
pub use transport::{HrmTransport, Notifications, Peripheral};

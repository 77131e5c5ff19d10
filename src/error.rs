//! Error types shared across the workout runner

use std::time::Duration;

use thiserror::Error;

/// Fatal workout errors. These indicate a logic defect and abort the event loop.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkoutError {
    /// A stage was entered with an index outside the plan
    #[error("stage index {index} is outside a plan of {len} stages")]
    StageOutOfRange { index: usize, len: usize },

    /// The countdown timer rejected an operation
    #[error("countdown timer error: {0}")]
    Timer(#[from] TimerError),

    /// The plan or one of its stages failed validation
    #[error("invalid workout plan: {0}")]
    InvalidPlan(String),
}

/// Countdown timer invariant violations
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum TimerError {
    #[error("countdown timer is already running")]
    AlreadyRunning,

    #[error("countdown interval must be non-zero")]
    ZeroInterval,
}

/// Heart-rate monitor link failures.
///
/// Every variant except `RetriesExhausted` is recovered inside the link by
/// restarting the connect sequence.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("no peripheral named {name} found within {timeout:?}")]
    ScanTimeout { name: String, timeout: Duration },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("discovery of {what} failed: {reason}")]
    Discovery { what: String, reason: String },

    #[error("peripheral disconnected")]
    Disconnected,

    #[error("gave up after {attempts} connection attempts")]
    RetriesExhausted { attempts: u32 },
}

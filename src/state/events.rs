//! Events consumed by the workout event loop

use crate::error::LinkError;

/// Logical button actions routed back from the display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Resume,
    Pause,
    /// Leave the finished workout and return to the launcher
    Finish,
}

/// Everything that can drive the workout controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkoutEvent {
    /// The heart-rate link completed its subscription
    LinkConnected { attempt: u64 },
    /// The heart-rate link failed or dropped; a retry is already scheduled
    LinkLost { attempt: u64, error: LinkError },
    /// The link stopped retrying
    LinkGaveUp { attempts: u32 },
    /// Countdown tick tagged with the timer generation that produced it
    Tick(u64),
    /// A button was pressed
    Button(Action),
}

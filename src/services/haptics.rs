//! Haptic feedback collaborator

use tracing::info;

/// Vibration lengths used by the workout, in milliseconds
pub const STAGE_COMPLETE_PULSES: [u32; 2] = [200, 1200];
pub const LINK_LOST_PULSE: u32 = 100;

/// Fire-and-forget vibration motor
pub trait Haptics {
    fn buzz(&mut self, millis: u32);
}

/// Haptics that only log
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleHaptics;

impl Haptics for ConsoleHaptics {
    fn buzz(&mut self, millis: u32) {
        info!(target: "hr_workout::haptics", "buzz {}ms", millis);
    }
}

//! Workout state machine states

use std::fmt;

use serde::Serialize;

/// Finite state of the workout controller. The wrapped index is the stage
/// the state refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "stage", rename_all = "snake_case")]
pub enum WorkoutState {
    /// Waiting for the first heart-rate link connection
    Idle,
    AwaitingStart(usize),
    Running(usize),
    Paused(usize),
    Complete,
}

impl WorkoutState {
    /// Stage index, with `plan_len` standing for the terminal state
    pub fn stage_index(&self, plan_len: usize) -> usize {
        match *self {
            WorkoutState::Idle => 0,
            WorkoutState::AwaitingStart(i) | WorkoutState::Running(i) | WorkoutState::Paused(i) => i,
            WorkoutState::Complete => plan_len,
        }
    }

    /// True once the link has connected at least once
    pub fn has_started(&self) -> bool {
        !matches!(self, WorkoutState::Idle)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, WorkoutState::Complete)
    }
}

impl fmt::Display for WorkoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkoutState::Idle => write!(f, "Idle"),
            WorkoutState::AwaitingStart(i) => write!(f, "AwaitingStart({})", i),
            WorkoutState::Running(i) => write!(f, "Running({})", i),
            WorkoutState::Paused(i) => write!(f, "Paused({})", i),
            WorkoutState::Complete => write!(f, "Complete"),
        }
    }
}

impl Default for WorkoutState {
    fn default() -> Self {
        WorkoutState::Idle
    }
}

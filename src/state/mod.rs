//! Workout state module
//! 
//! This module contains the workout plan, the countdown timer and the
//! state machine that ties them together.

pub mod controller;
pub mod events;
pub mod plan;
pub mod timer_state;
pub mod workout_state;

// Re-export main types
pub use controller::{Flow, WorkoutController};
pub use events::{Action, WorkoutEvent};
pub use plan::{Intensity, WorkoutPlan, WorkoutStage};
pub use timer_state::CountdownTimer;
pub use workout_state::WorkoutState;

//! HR Workout - A heart-rate paced interval workout runner
//! 
//! This library drives a multi-stage workout plan with a countdown per stage,
//! showing live readings from a heart-rate monitor that is kept connected in
//! the background.

pub mod config;
pub mod error;
pub mod state;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{LinkError, TimerError, WorkoutError};
pub use state::{WorkoutController, WorkoutPlan, WorkoutState};
pub use utils::signals::shutdown_signal;

//! Background tasks module
//! 
//! This module contains the tasks that run alongside the heart-rate link.

pub mod button_input;
pub mod workout_loop;

// Re-export main functions
pub use button_input::button_input_task;
pub use workout_loop::workout_loop_task;

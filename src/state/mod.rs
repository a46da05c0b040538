//! State management module
//! 
//! This module contains the countdown state and the shared state handed to
//! the observer API.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use timer_state::{format_remaining, Durations, TimerMode, TimerState};

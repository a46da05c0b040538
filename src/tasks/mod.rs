//! Background tasks module
//! 
//! This module contains the scheduler task that owns the countdown, its
//! wake-up source, and the optional autoplay observer.

pub mod autoplay;
pub mod scheduler;
pub mod wakeup;

// Re-export main types and functions
pub use autoplay::autoplay_task;
pub use scheduler::{timer_scheduler_task, TimerScheduler, TICK_MS};
pub use wakeup::{Wakeup, WakeupHandle, WakeupSource, TICK_PERIOD};

//! Focus Timer - a durable work/break countdown daemon
//! 
//! This library provides the countdown scheduler, its durable store, and the
//! command/notification channel that detached displays use to control it.

pub mod config;
pub mod state;
pub mod store;
pub mod channel;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use state::{AppState, Durations, TimerMode, TimerState};
pub use store::{FileStore, MemoryStore, StateStore};
pub use channel::{Command, CommandResponse, Notification, ObserverChannel};
pub use tasks::TimerScheduler;
pub use api::create_router;
pub use utils::signals::shutdown_signal;

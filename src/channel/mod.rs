//! Observer channel module
//! 
//! Carries commands from any number of detached observers to the single
//! scheduler and broadcasts its notifications back to whoever is listening.

pub mod observer;
pub mod protocol;

// Re-export main types
pub use observer::{CommandEnvelope, Notifier, ObserverChannel, Subscription};
pub use protocol::{Command, CommandResponse, CommandStatus, Notification};

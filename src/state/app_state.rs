//! Shared state handed to the observer API

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tracing::warn;

use super::{Durations, TimerState};
use crate::{
    channel::{Command, CommandResponse, ObserverChannel},
    store::{StateStore, StoreMap, TIMER_KEYS},
};

/// State shared by every HTTP handler.
///
/// Holds no timer state of its own: commands go through the observer channel
/// and durable reads go to the store, exactly like a detached display would.
pub struct AppState {
    /// Route to the scheduler task
    pub channel: ObserverChannel,
    /// Durable store the scheduler writes through to
    pub store: Arc<dyn StateStore>,
    pub durations: Durations,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last command tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        channel: ObserverChannel,
        store: Arc<dyn StateStore>,
        durations: Durations,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            channel,
            store,
            durations,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Forward a command to the scheduler, remembering it as the last action
    pub async fn dispatch(&self, command: Command) -> Result<CommandResponse, String> {
        let action = command.name();
        let response = self.channel.send(command).await?;

        if action != "getState" {
            self.record_action(action);
        }
        Ok(response)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Current timer snapshot from the scheduler
    pub async fn get_timer_state(&self) -> Result<TimerState, String> {
        self.channel.get_state().await
    }

    /// What a polling display would read from durable storage right now
    pub async fn get_stored_state(&self) -> StoreMap {
        match self.store.get(&TIMER_KEYS).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to read durable timer state: {:#}", e);
                StoreMap::new()
            }
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last command information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

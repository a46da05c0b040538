//! Command and notification messages exchanged with observers

use serde::{Deserialize, Serialize};

use crate::state::{TimerMode, TimerState};

/// Request sent by an observer, tagged by its `command` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Begin ticking, optionally overriding the remaining time (ms)
    Start {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        time: Option<i64>,
    },
    Pause,
    Reset,
    SwitchMode {
        #[serde(rename = "newMode")]
        new_mode: TimerMode,
    },
    GetState,
}

impl Command {
    /// Parse a raw message, returning `None` for anything not understood
    pub fn from_json(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    /// Wire name of the command, used for logging and action tracking
    pub fn name(&self) -> &'static str {
        match self {
            Command::Start { .. } => "start",
            Command::Pause => "pause",
            Command::Reset => "reset",
            Command::SwitchMode { .. } => "switchMode",
            Command::GetState => "getState",
        }
    }

    /// Requested start time, with non-positive values treated as absent
    pub fn requested_time(time: Option<i64>) -> Option<u64> {
        time.filter(|&t| t > 0).map(|t| t as u64)
    }
}

/// Acknowledgment status for the state-changing commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Started,
    Paused,
    Reset,
    /// `start` was refused because there was no time left to count down.
    /// Only reachable with zero-length durations, which the CLI rejects.
    Idle,
}

/// Reply to a command. Serializes to the bare response object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandResponse {
    Status { status: CommandStatus },
    Mode { mode: TimerMode },
    State(TimerState),
    /// Reply for messages that were ignored
    Empty {},
}

impl CommandResponse {
    pub fn status(status: CommandStatus) -> Self {
        CommandResponse::Status { status }
    }

    pub fn empty() -> Self {
        CommandResponse::Empty {}
    }
}

/// Unsolicited message broadcast to every attached observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Notification {
    /// The countdown reached zero
    Finished,
}

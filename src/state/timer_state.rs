//! Timer state structure and management

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Which half of the work/break cycle the countdown belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerMode {
    #[default]
    Work,
    Break,
}

impl TimerMode {
    /// Name used on the wire and in the durable store
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Work => "work",
            TimerMode::Break => "break",
        }
    }

    /// The mode that follows this one in the cycle
    pub fn other(&self) -> Self {
        match self {
            TimerMode::Work => TimerMode::Break,
            TimerMode::Break => TimerMode::Work,
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(TimerMode::Work),
            "break" => Ok(TimerMode::Break),
            other => Err(format!("Unknown timer mode: {}", other)),
        }
    }
}

/// Countdown lengths in milliseconds, fixed for the process lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Durations {
    pub work_ms: u64,
    pub break_ms: u64,
}

impl Durations {
    /// Convert minutes to milliseconds, saturating instead of overflowing
    pub fn from_minutes(work_minutes: u64, break_minutes: u64) -> Self {
        Self {
            work_ms: work_minutes.saturating_mul(60_000),
            break_ms: break_minutes.saturating_mul(60_000),
        }
    }

    /// Full countdown length for a mode
    pub fn for_mode(&self, mode: TimerMode) -> u64 {
        match mode {
            TimerMode::Work => self.work_ms,
            TimerMode::Break => self.break_ms,
        }
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self::from_minutes(25, 5)
    }
}

/// Mutable countdown state, written only by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub remaining_time: u64,
    pub is_running: bool,
    pub mode: TimerMode,
}

impl TimerState {
    /// Create an idle timer at the start of a work interval
    pub fn new(durations: &Durations) -> Self {
        Self::idle(TimerMode::Work, durations.work_ms)
    }

    /// Create an idle timer for a mode with the given remaining time
    pub fn idle(mode: TimerMode, remaining_time: u64) -> Self {
        Self {
            remaining_time,
            is_running: false,
            mode,
        }
    }

    /// Remaining time rendered for displays
    pub fn display(&self) -> String {
        format_remaining(self.remaining_time)
    }
}

/// Render milliseconds as `mm:ss`; whole hours wrap, like a kitchen timer.
pub fn format_remaining(ms: u64) -> String {
    let seconds = (ms / 1000) % 60;
    let minutes = (ms / (1000 * 60)) % 60;
    format!("{:02}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trips_through_wire_names() {
        assert_eq!("work".parse::<TimerMode>(), Ok(TimerMode::Work));
        assert_eq!("break".parse::<TimerMode>(), Ok(TimerMode::Break));
        assert!("nap".parse::<TimerMode>().is_err());
        assert_eq!(serde_json::to_string(&TimerMode::Break).unwrap(), "\"break\"");
        assert_eq!(TimerMode::Work.other(), TimerMode::Break);
        assert_eq!(TimerMode::Break.other(), TimerMode::Work);
    }

    #[test]
    fn default_durations() {
        let durations = Durations::default();
        assert_eq!(durations.for_mode(TimerMode::Work), 1_500_000);
        assert_eq!(durations.for_mode(TimerMode::Break), 300_000);
    }

    #[test]
    fn huge_minute_counts_saturate() {
        let durations = Durations::from_minutes(u64::MAX / 1000, 5);
        assert_eq!(durations.work_ms, u64::MAX);
        assert_eq!(durations.break_ms, 300_000);
    }

    #[test]
    fn new_state_is_idle_work() {
        let state = TimerState::new(&Durations::default());
        assert_eq!(state.mode, TimerMode::Work);
        assert_eq!(state.remaining_time, 1_500_000);
        assert!(!state.is_running);
    }

    #[test]
    fn state_serializes_with_protocol_field_names() {
        let state = TimerState::idle(TimerMode::Break, 42_000);
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"remainingTime": 42_000, "isRunning": false, "mode": "break"})
        );
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_remaining(1_500_000), "25:00");
        assert_eq!(format_remaining(61_999), "01:01");
        assert_eq!(format_remaining(0), "00:00");
        assert_eq!(format_remaining(3_600_000 + 5_000), "00:05");
    }
}

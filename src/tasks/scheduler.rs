//! The authoritative countdown state machine and the task that owns it

use std::{sync::Arc, time::Duration};

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::wakeup::{Wakeup, WakeupHandle, WakeupSource};
use crate::{
    channel::{Command, CommandEnvelope, CommandResponse, CommandStatus, Notification, Notifier},
    state::{Durations, TimerMode, TimerState},
    store::{StateStore, StoreMap, MODE_KEY, REMAINING_TIME_KEY, TIMER_KEYS},
};

/// Milliseconds removed from the countdown per tick
pub const TICK_MS: u64 = 1000;

/// Single owner of [`TimerState`].
///
/// `is_running` and `wakeup` always move together: a running timer holds
/// exactly one armed source and an idle timer holds none.
pub struct TimerScheduler {
    state: TimerState,
    durations: Durations,
    store: Arc<dyn StateStore>,
    notifier: Notifier,
    source: WakeupSource,
    wakeup: Option<WakeupHandle>,
}

impl TimerScheduler {
    /// Create an idle scheduler at the start of a work interval
    pub fn new(
        store: Arc<dyn StateStore>,
        durations: Durations,
        notifier: Notifier,
        tick_period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Wakeup>) {
        let (source, ticks) = WakeupSource::new(tick_period);
        let scheduler = Self {
            state: TimerState::new(&durations),
            durations,
            store,
            notifier,
            source,
            wakeup: None,
        };
        (scheduler, ticks)
    }

    /// Create a scheduler seeded from whatever the store last recorded
    pub async fn restore(
        store: Arc<dyn StateStore>,
        durations: Durations,
        notifier: Notifier,
        tick_period: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<Wakeup>) {
        let (mut scheduler, ticks) = Self::new(store, durations, notifier, tick_period);
        scheduler.state = scheduler.load_state().await;
        info!(
            "Restored {} timer with {} remaining",
            scheduler.state.mode,
            scheduler.state.display()
        );
        (scheduler, ticks)
    }

    async fn load_state(&self) -> TimerState {
        let stored = match self.store.get(&TIMER_KEYS).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Failed to read stored timer state, using defaults: {:#}", e);
                return TimerState::new(&self.durations);
            }
        };

        let mode = stored
            .get(MODE_KEY)
            .and_then(Value::as_str)
            .and_then(|m| m.parse::<TimerMode>().ok())
            .unwrap_or_default();
        let remaining_time = stored
            .get(REMAINING_TIME_KEY)
            .and_then(Value::as_u64)
            .filter(|&ms| ms > 0)
            .unwrap_or_else(|| self.durations.for_mode(mode));

        TimerState::idle(mode, remaining_time)
    }

    /// Read-only snapshot of the timer
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Generation of the armed wake-up source, if any
    pub fn armed_generation(&self) -> Option<u64> {
        self.wakeup.as_ref().map(WakeupHandle::generation)
    }

    /// Apply one command and produce its reply
    pub async fn handle(&mut self, command: Command) -> CommandResponse {
        match command {
            Command::Start { time } => self.start(Command::requested_time(time)).await,
            Command::Pause => self.pause().await,
            Command::Reset => self.reset().await,
            Command::SwitchMode { new_mode } => self.switch_mode(new_mode).await,
            Command::GetState => CommandResponse::State(self.state),
        }
    }

    /// Begin ticking.
    ///
    /// A positive `requested_time` replaces the remaining time. Without one,
    /// a finished countdown refills from the mode's duration. If there is still
    /// nothing to count (zero-length durations) no source is armed and the reply
    /// is `{status: "idle"}` instead of `started`.
    pub async fn start(&mut self, requested_time: Option<u64>) -> CommandResponse {
        if let Some(time) = requested_time {
            self.state.remaining_time = time;
        } else if self.state.remaining_time == 0 {
            self.state.remaining_time = self.durations.for_mode(self.state.mode);
        }

        if self.state.remaining_time == 0 {
            warn!("Ignoring start with no time left on the {} timer", self.state.mode);
            return CommandResponse::status(CommandStatus::Idle);
        }

        self.state.is_running = true;
        if self.wakeup.is_none() {
            self.wakeup = Some(self.source.arm());
        } else {
            debug!("Timer already running, keeping the armed wake-up source");
        }

        info!("Timer started: {} with {} remaining", self.state.mode, self.state.display());
        self.persist_all().await;
        CommandResponse::status(CommandStatus::Started)
    }

    pub async fn pause(&mut self) -> CommandResponse {
        self.stop_ticking();
        info!("Timer paused with {} remaining", self.state.display());
        self.persist_all().await;
        CommandResponse::status(CommandStatus::Paused)
    }

    pub async fn reset(&mut self) -> CommandResponse {
        self.stop_ticking();
        self.state.remaining_time = self.durations.for_mode(self.state.mode);
        info!("Timer reset to {} for {}", self.state.display(), self.state.mode);
        self.persist_all().await;
        CommandResponse::status(CommandStatus::Reset)
    }

    /// Change mode and refill the countdown. A running timer keeps running.
    pub async fn switch_mode(&mut self, new_mode: TimerMode) -> CommandResponse {
        self.state.mode = new_mode;
        self.state.remaining_time = self.durations.for_mode(new_mode);
        if self.state.is_running {
            debug!("Mode switched while running, countdown continues");
        }
        info!("Timer switched to {} ({})", new_mode, self.state.display());
        self.persist_all().await;
        CommandResponse::Mode { mode: new_mode }
    }

    /// Advance the countdown by one tick
    pub async fn on_tick(&mut self, wakeup: Wakeup) {
        if !self.state.is_running {
            debug!("Ignoring tick from source {} while idle", wakeup.generation);
            return;
        }
        if self.armed_generation() != Some(wakeup.generation) {
            debug!("Ignoring tick from disarmed source {}", wakeup.generation);
            return;
        }

        self.state.remaining_time = self.state.remaining_time.saturating_sub(TICK_MS);
        debug!("Tick: {} remaining", self.state.display());

        if self.state.remaining_time == 0 {
            self.stop_ticking();
            info!("{} timer finished", self.state.mode);
            self.persist_remaining().await;
            self.notifier.publish(Notification::Finished);
        } else {
            self.persist_remaining().await;
        }
    }

    fn stop_ticking(&mut self) {
        self.state.is_running = false;
        if let Some(handle) = self.wakeup.take() {
            debug!("Disarmed wake-up source {}", handle.generation());
        }
    }

    async fn persist_all(&self) {
        self.persist(StoreMap::from([
            (MODE_KEY.to_string(), json!(self.state.mode)),
            (REMAINING_TIME_KEY.to_string(), json!(self.state.remaining_time)),
        ]))
        .await;
    }

    async fn persist_remaining(&self) {
        self.persist(StoreMap::from([(
            REMAINING_TIME_KEY.to_string(),
            json!(self.state.remaining_time),
        )]))
        .await;
    }

    async fn persist(&self, entries: StoreMap) {
        if let Err(e) = self.store.set(entries).await {
            warn!("Failed to write timer state through to the store: {:#}", e);
        }
    }
}

/// Background task that owns the scheduler and serializes every command and tick
pub async fn timer_scheduler_task(
    mut scheduler: TimerScheduler,
    mut ticks: mpsc::UnboundedReceiver<Wakeup>,
    mut commands: mpsc::Receiver<CommandEnvelope>,
) {
    info!("Starting timer scheduler task");

    loop {
        tokio::select! {
            envelope = commands.recv() => {
                let Some(CommandEnvelope { command, reply }) = envelope else {
                    info!("All observer handles dropped, stopping timer scheduler");
                    break;
                };

                let name = command.name();
                let response = scheduler.handle(command).await;
                if reply.send(response).is_err() {
                    debug!("Observer went away before the {} reply", name);
                }
            }

            Some(wakeup) = ticks.recv() => {
                scheduler.on_tick(wakeup).await;
            }
        }
    }

    scheduler.stop_ticking();
}

//! Command routing and notification fan-out between observers and the scheduler

use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, warn};

use super::protocol::{Command, CommandResponse, Notification};
use crate::state::{TimerMode, TimerState};

/// Queue depth for commands waiting on the scheduler
pub const COMMAND_QUEUE_SIZE: usize = 64;
/// Notifications retained for slow subscribers before they start lagging
pub const NOTIFICATION_BUFFER_SIZE: usize = 16;

/// A command plus the slot its reply goes into
#[derive(Debug)]
pub struct CommandEnvelope {
    pub command: Command,
    pub reply: oneshot::Sender<CommandResponse>,
}

/// Handle observers use to drive the scheduler and listen for notifications.
///
/// Cheap to clone. The scheduler task stops once every clone is dropped.
#[derive(Debug, Clone)]
pub struct ObserverChannel {
    commands: mpsc::Sender<CommandEnvelope>,
    notifier: Notifier,
}

impl ObserverChannel {
    /// Create a channel and the receiving end the scheduler task consumes
    pub fn new() -> (Self, mpsc::Receiver<CommandEnvelope>) {
        let (commands, command_rx) = mpsc::channel(COMMAND_QUEUE_SIZE);
        let (notifications, _) = broadcast::channel(NOTIFICATION_BUFFER_SIZE);
        let channel = Self {
            commands,
            notifier: Notifier { notifications },
        };
        (channel, command_rx)
    }

    /// Publishing side handed to the scheduler
    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    /// Deliver a command to the scheduler and wait for its reply
    pub async fn send(&self, command: Command) -> Result<CommandResponse, String> {
        let (reply, reply_rx) = oneshot::channel();
        self.commands
            .send(CommandEnvelope { command, reply })
            .await
            .map_err(|_| "Timer scheduler is not running".to_string())?;

        reply_rx
            .await
            .map_err(|e| format!("Timer scheduler dropped the reply: {}", e))
    }

    pub async fn start(&self, time: Option<i64>) -> Result<CommandResponse, String> {
        self.send(Command::Start { time }).await
    }

    pub async fn pause(&self) -> Result<CommandResponse, String> {
        self.send(Command::Pause).await
    }

    pub async fn reset(&self) -> Result<CommandResponse, String> {
        self.send(Command::Reset).await
    }

    pub async fn switch_mode(&self, new_mode: TimerMode) -> Result<CommandResponse, String> {
        self.send(Command::SwitchMode { new_mode }).await
    }

    /// Fetch a snapshot of the timer
    pub async fn get_state(&self) -> Result<TimerState, String> {
        match self.send(Command::GetState).await? {
            CommandResponse::State(state) => Ok(state),
            other => Err(format!("Unexpected reply to getState: {:?}", other)),
        }
    }

    /// Attach a new listener. It only sees notifications published from now on.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            notifications: self.notifier.notifications.subscribe(),
        }
    }

    /// Number of listeners currently attached
    pub fn subscriber_count(&self) -> usize {
        self.notifier.notifications.receiver_count()
    }
}

/// Best-effort broadcaster for notifications
#[derive(Debug, Clone)]
pub struct Notifier {
    notifications: broadcast::Sender<Notification>,
}

impl Notifier {
    /// Send to whoever is attached right now, returning how many listeners got it
    pub fn publish(&self, notification: Notification) -> usize {
        match self.notifications.send(notification) {
            Ok(delivered) => {
                debug!("Notification {:?} delivered to {} observers", notification, delivered);
                delivered
            }
            Err(_) => {
                debug!("No observers attached, dropping {:?}", notification);
                0
            }
        }
    }
}

/// An attached listener; dropping it detaches
#[derive(Debug)]
pub struct Subscription {
    notifications: broadcast::Receiver<Notification>,
}

impl Subscription {
    /// Wait for the next notification. Returns `None` once the channel is gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.notifications.recv().await {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("Observer lagged behind, skipped {} notifications", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Take a pending notification without waiting
    pub fn try_recv(&mut self) -> Option<Notification> {
        loop {
            match self.notifications.try_recv() {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!("Observer lagged behind, skipped {} notifications", skipped);
                }
                Err(_) => return None,
            }
        }
    }

    /// Detach explicitly
    pub fn unsubscribe(self) {}
}

//! Observer that keeps the work/break cycle going on its own

use tracing::{debug, error, info};

use crate::channel::{Notification, ObserverChannel};

/// Background task that starts the next interval whenever one finishes.
///
/// It acts purely through the observer channel, like any display would.
pub async fn autoplay_task(channel: ObserverChannel) {
    info!("Starting autoplay observer");

    let mut subscription = channel.subscribe();
    while let Some(notification) = subscription.recv().await {
        match notification {
            Notification::Finished => {
                if let Err(e) = advance_cycle(&channel).await {
                    error!("Autoplay failed to start the next interval: {}", e);
                }
            }
        }
    }

    debug!("Notification channel closed, stopping autoplay observer");
}

async fn advance_cycle(channel: &ObserverChannel) -> Result<(), String> {
    let finished = channel.get_state().await?;
    let next = finished.mode.other();

    channel.switch_mode(next).await?;
    channel.start(None).await?;
    info!("Autoplay: {} finished, started {}", finished.mode, next);
    Ok(())
}

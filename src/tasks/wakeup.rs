//! Recurring wake-up source driving the countdown

use std::time::Duration;

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Nominal spacing between ticks
pub const TICK_PERIOD: Duration = Duration::from_millis(1000);

/// One tick, stamped with the generation of the source that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup {
    pub generation: u64,
}

/// Armed wake-up source. Dropping it stops further ticks.
///
/// Ticks already queued before the drop can still be delivered, so receivers
/// must compare the generation against the source they currently hold.
#[derive(Debug)]
pub struct WakeupHandle {
    generation: u64,
    task: JoinHandle<()>,
}

impl WakeupHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for WakeupHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Factory for wake-up sources that all feed the same receiver
#[derive(Debug)]
pub struct WakeupSource {
    period: Duration,
    ticks: mpsc::UnboundedSender<Wakeup>,
    next_generation: u64,
}

impl WakeupSource {
    /// Create a source firing every `period` and the receiver its ticks land in
    pub fn new(period: Duration) -> (Self, mpsc::UnboundedReceiver<Wakeup>) {
        let (ticks, tick_rx) = mpsc::unbounded_channel();
        let source = Self {
            period,
            ticks,
            next_generation: 0,
        };
        (source, tick_rx)
    }

    /// Spawn a new recurring ticker. The first tick comes one period from now.
    ///
    /// Late ticks are delivered in a burst when the runtime catches up, so a
    /// stalled process loses at most the tick that was in flight.
    pub fn arm(&mut self) -> WakeupHandle {
        self.next_generation += 1;
        let generation = self.next_generation;
        let period = self.period;
        let ticks = self.ticks.clone();

        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

            loop {
                interval.tick().await;
                if ticks.send(Wakeup { generation }).is_err() {
                    debug!("Tick receiver closed, stopping wake-up source {}", generation);
                    break;
                }
            }
        });

        debug!("Armed wake-up source {} every {:?}", generation, period);
        WakeupHandle { generation, task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn first_tick_comes_after_one_period() {
        let (mut source, mut ticks) = WakeupSource::new(TICK_PERIOD);
        let handle = source.arm();

        time::sleep(Duration::from_millis(500)).await;
        assert!(ticks.try_recv().is_err());

        time::sleep(Duration::from_millis(600)).await;
        assert_eq!(ticks.try_recv(), Ok(Wakeup { generation: handle.generation() }));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_ticks() {
        let (mut source, mut ticks) = WakeupSource::new(TICK_PERIOD);
        let handle = source.arm();

        time::sleep(Duration::from_millis(2500)).await;
        assert!(ticks.try_recv().is_ok());
        assert!(ticks.try_recv().is_ok());
        assert!(ticks.try_recv().is_err());

        drop(handle);
        time::sleep(Duration::from_secs(5)).await;
        assert!(ticks.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_runtime_gets_missed_ticks_in_a_burst() {
        let (mut source, mut ticks) = WakeupSource::new(TICK_PERIOD);
        let handle = source.arm();
        tokio::task::yield_now().await;

        time::advance(Duration::from_millis(5_100)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }

        let mut delivered = 0;
        while let Ok(wakeup) = ticks.try_recv() {
            assert_eq!(wakeup.generation, handle.generation());
            delivered += 1;
        }
        assert_eq!(delivered, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn each_arm_gets_a_new_generation() {
        let (mut source, _ticks) = WakeupSource::new(TICK_PERIOD);
        let first = source.arm();
        let second = source.arm();
        assert_ne!(first.generation(), second.generation());
    }
}

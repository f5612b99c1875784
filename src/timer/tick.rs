//! One-second tick source owned by a running timer

use std::time::Duration;

use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Interval between ticks while a timer runs
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Handle to a spawned tick loop.
///
/// The loop stops on its own once the callback returns `false`, and is
/// aborted when the handle is dropped, so holding the handle is what keeps a
/// timer running.
#[derive(Debug)]
pub struct TickSource {
    handle: JoinHandle<()>,
}

impl TickSource {
    /// Spawn a loop that calls `on_tick` once per `period`, first after one
    /// full period. Must be called from within a Tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            // Late ticks are not replayed in a burst
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if !on_tick() {
                    debug!("Tick source finished");
                    break;
                }
            }
        });

        Self { handle }
    }

    /// Whether the loop has ended
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    };

    use tokio::time::sleep;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period_after_the_first_period() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let source = TickSource::spawn(TICK_PERIOD, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        sleep(Duration::from_millis(3000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        drop(source);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_ticks() {
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let source = TickSource::spawn(TICK_PERIOD, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        });

        sleep(Duration::from_millis(1500)).await;
        drop(source);
        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_can_end_the_loop() {
        let source = TickSource::spawn(TICK_PERIOD, || false);
        sleep(Duration::from_millis(1500)).await;
        assert!(source.is_finished());
    }
}

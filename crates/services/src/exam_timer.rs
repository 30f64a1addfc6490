use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval};

/// Display tick for the exam clock.
pub const TICK: Duration = Duration::from_secs(1);

/// Background task publishing elapsed exam time once per tick.
///
/// The tick only reads the clock; grading never waits on it. `stop` and `Drop` both abort
/// the task, so leaving a session cancels the timer deterministically. Must be started
/// from within a tokio runtime.
pub struct ExamTimer {
    started: Instant,
    elapsed: watch::Receiver<Duration>,
    handle: JoinHandle<()>,
}

impl ExamTimer {
    #[must_use]
    pub fn start() -> Self {
        Self::start_with_tick(TICK)
    }

    #[must_use]
    pub fn start_with_tick(tick: Duration) -> Self {
        let started = Instant::now();
        let (tx, elapsed) = watch::channel(Duration::ZERO);
        let handle = tokio::spawn(async move {
            let mut ticks = interval(tick);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticks.tick().await;
                if tx.send(started.elapsed()).is_err() {
                    break;
                }
            }
        });
        Self {
            started,
            elapsed,
            handle,
        }
    }

    /// Elapsed time as of the last tick.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.borrow()
    }

    /// Receiver for rendering loops that wait on `changed()`.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Duration> {
        self.elapsed.clone()
    }

    /// Cancel the tick task and return the exact elapsed time.
    pub fn stop(self) -> Duration {
        self.handle.abort();
        self.started.elapsed()
    }
}

impl Drop for ExamTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn publishes_elapsed_time_each_tick() {
        let timer = ExamTimer::start();
        sleep(Duration::from_millis(3_500)).await;
        assert_eq!(timer.elapsed().as_secs(), 3);

        let total = timer.stop();
        assert!(total >= Duration::from_millis(3_500));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_the_task() {
        let timer = ExamTimer::start();
        let mut rx = timer.subscribe();
        timer.stop();

        sleep(Duration::from_secs(2)).await;
        assert!(rx.changed().await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_cancels_the_task() {
        let timer = ExamTimer::start();
        let mut rx = timer.subscribe();
        drop(timer);

        sleep(Duration::from_secs(2)).await;
        assert!(rx.changed().await.is_err());
    }
}

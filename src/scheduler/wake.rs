//! Wake signal that cuts the scheduler's timed wait short

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// How a wait ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeOutcome {
    Signaled,
    TimedOut,
}

/// Single binary event with "wait with timeout, wake early, clear on consume".
///
/// `set` never blocks and may be called from any task. Several sets before a
/// wait collapse into one wake.
#[derive(Debug, Clone, Default)]
pub struct WakeSignal {
    notify: Arc<Notify>,
}

impl WakeSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self) {
        // Stores at most one permit when nobody is waiting
        self.notify.notify_one();
    }

    /// Wait until the signal is set or `timeout` elapses, consuming the signal
    pub async fn wait(&self, timeout: Duration) -> WakeOutcome {
        match tokio::time::timeout(timeout, self.notify.notified()).await {
            Ok(()) => WakeOutcome::Signaled,
            Err(_) => WakeOutcome::TimedOut,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_times_out_without_signal() {
        let wake = WakeSignal::new();
        let start = Instant::now();
        assert_eq!(wake.wait(Duration::from_secs(10)).await, WakeOutcome::TimedOut);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_set_before_wait_is_kept() {
        let wake = WakeSignal::new();
        wake.set();
        let start = Instant::now();
        assert_eq!(wake.wait(Duration::from_secs(10)).await, WakeOutcome::Signaled);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_sets_wake_once() {
        let wake = WakeSignal::new();
        wake.set();
        wake.set();
        wake.set();
        assert_eq!(wake.wait(Duration::from_secs(1)).await, WakeOutcome::Signaled);
        assert_eq!(wake.wait(Duration::from_secs(1)).await, WakeOutcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_from_another_task_interrupts_wait() {
        let wake = WakeSignal::new();
        let setter = wake.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            setter.set();
        });

        let start = Instant::now();
        assert_eq!(wake.wait(Duration::from_secs(10)).await, WakeOutcome::Signaled);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
    }
}

//! Fixed-period background polling.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// What the poll loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollControl {
    Continue,
    Stop,
}

/// A single restartable polling task.
///
/// At most one loop runs at a time; `start` while running is a no-op.
#[derive(Debug)]
pub struct Poller {
    period: Duration,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Poller {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            handle: Mutex::new(None),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Spawn the poll loop unless one is already running.
    ///
    /// Returns `true` if a new loop was spawned. The first tick fires one
    /// period after the call.
    pub fn start<F, Fut>(&self, mut tick: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = PollControl> + Send + 'static,
    {
        let mut handle = self.handle.lock().unwrap_or_else(|e| e.into_inner());
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            return false;
        }

        let period = self.period;
        *handle = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(time::Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if tick().await == PollControl::Stop {
                    tracing::debug!("Poll loop stopped: no remaining work");
                    break;
                }
            }
        }));
        true
    }

    /// Abort the poll loop if it is running.
    pub fn stop(&self) {
        if let Some(handle) = self
            .handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_tick_says_so() {
        let poller = Poller::new(Duration::from_secs(1));
        let ticks = Arc::new(AtomicUsize::new(0));

        let counter = ticks.clone();
        assert!(poller.start(move || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) + 1 >= 3 {
                    PollControl::Stop
                } else {
                    PollControl::Continue
                }
            }
        }));
        assert!(poller.is_running());

        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
        assert!(!poller.is_running());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_is_noop_and_stop_aborts() {
        let poller = Poller::new(Duration::from_secs(1));
        let ticks = Arc::new(AtomicUsize::new(0));

        let counter = ticks.clone();
        let tick = move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                PollControl::Continue
            }
        };
        assert!(poller.start(tick.clone()));
        assert!(!poller.start(tick));

        time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);

        poller.stop();
        tokio::task::yield_now().await;
        assert!(!poller.is_running());

        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }
}

//! Trailing-edge debouncing of async actions.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

/// Delay before search suggestions refresh while typing.
pub const SUGGESTION_DELAY: Duration = Duration::from_millis(300);

/// Runs only the last of a burst of actions, once `delay` has passed
/// without a newer call.
///
/// Each call aborts the still-waiting previous one. Dropping the debouncer
/// aborts whatever is pending. Must be used inside a tokio runtime.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `action`, replacing any action still waiting.
    pub fn call<F>(&self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action.await;
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Drop the waiting action, if any.
    pub fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
    }

    /// Wait for the scheduled action, if any, to run to completion.
    pub async fn settle(&self) {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner).take();
        let Some(handle) = pending else {
            return;
        };
        if let Err(err) = handle.await {
            debug!(error = %err, "Debounced action did not complete");
        }
    }

    /// Whether an action is scheduled or running.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tokio::time::sleep;

    use super::*;

    fn recorder() -> Arc<Mutex<Vec<u32>>> {
        Arc::new(Mutex::new(Vec::new()))
    }

    fn record(seen: &Arc<Mutex<Vec<u32>>>, value: u32) -> impl Future<Output = ()> + Send + 'static {
        let seen = Arc::clone(seen);
        async move { seen.lock().unwrap().push(value) }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_once_with_last_input() {
        let seen = recorder();
        let debouncer = Debouncer::new(SUGGESTION_DELAY);

        for value in 0..3 {
            debouncer.call(record(&seen, value));
            sleep(Duration::from_millis(100)).await;
        }
        assert!(seen.lock().unwrap().is_empty());

        sleep(Duration::from_millis(400)).await;
        assert_eq!(*seen.lock().unwrap(), vec![2]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_spaced_calls_each_run() {
        let seen = recorder();
        let debouncer = Debouncer::new(Duration::from_millis(500));

        debouncer.call(record(&seen, 1));
        sleep(Duration::from_millis(600)).await;
        debouncer.call(record(&seen, 2));
        sleep(Duration::from_millis(600)).await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_waits_for_last_action_of_burst() {
        let seen = recorder();
        let debouncer = Debouncer::new(SUGGESTION_DELAY);

        for value in 0..3 {
            debouncer.call(record(&seen, value));
        }
        debouncer.settle().await;

        assert_eq!(*seen.lock().unwrap(), vec![2]);
        assert!(!debouncer.is_pending());

        debouncer.settle().await;
        assert_eq!(*seen.lock().unwrap(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_action() {
        let seen = recorder();
        let debouncer = Debouncer::new(SUGGESTION_DELAY);

        debouncer.call(record(&seen, 1));
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        sleep(Duration::from_secs(1)).await;
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_aborts_pending_action() {
        let seen = recorder();
        {
            let debouncer = Debouncer::new(SUGGESTION_DELAY);
            debouncer.call(record(&seen, 1));
        }
        sleep(Duration::from_secs(1)).await;
        assert!(seen.lock().unwrap().is_empty());
    }
}

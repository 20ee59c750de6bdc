//! Cancellable background save timers.
//!
//! Two timers feed the same save routine: a debounce that restarts on every
//! edit and a fixed-period tick. Neither queues work; the wizard's busy flag
//! turns an overlapping save into a no-op.

use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

#[derive(Default)]
pub struct AutoSaveScheduler {
    debounce: Mutex<Option<JoinHandle<()>>>,
    periodic: Mutex<Option<JoinHandle<()>>>,
}

impl AutoSaveScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` once `delay` has passed without another call.
    ///
    /// Only the wait is cancelled by a later call; a task that already
    /// started runs to completion on its own. Outside a runtime this is a
    /// no-op.
    pub fn debounce<F, Fut>(&self, delay: Duration, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            return;
        };
        let detach = runtime.clone();
        let handle = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            detach.spawn(task());
        });
        replace(&self.debounce, Some(handle));
    }

    /// Run `task` every `period`, first after one full period. Replaces any
    /// previous periodic task.
    pub fn every<F, Fut>(&self, period: Duration, task: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Ok(runtime) = Handle::try_current() else {
            return;
        };
        let detach = runtime.clone();
        let handle = runtime.spawn(async move {
            loop {
                tokio::time::sleep(period).await;
                detach.spawn(task());
            }
        });
        replace(&self.periodic, Some(handle));
    }

    /// Whether a debounced save is still waiting.
    #[must_use]
    pub fn debounce_pending(&self) -> bool {
        self.debounce
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    #[must_use]
    pub fn is_periodic_running(&self) -> bool {
        self.periodic
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn cancel_debounce(&self) {
        replace(&self.debounce, None);
    }

    pub fn cancel_all(&self) {
        replace(&self.debounce, None);
        replace(&self.periodic, None);
    }
}

impl Drop for AutoSaveScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn replace(slot: &Mutex<Option<JoinHandle<()>>>, next: Option<JoinHandle<()>>) {
    let previous = std::mem::replace(
        &mut *slot.lock().unwrap_or_else(PoisonError::into_inner),
        next,
    );
    if let Some(previous) = previous {
        previous.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl Fn() -> std::future::Ready<()> + Clone) {
        let count = Arc::new(AtomicUsize::new(0));
        let task_count = Arc::clone(&count);
        let task = move || {
            task_count.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        };
        (count, task)
    }

    #[tokio::test(start_paused = true)]
    async fn debounce_coalesces_bursts() {
        let scheduler = AutoSaveScheduler::new();
        let (count, task) = counter();

        for _ in 0..3 {
            scheduler.debounce(Duration::from_millis(1500), task.clone());
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(scheduler.debounce_pending());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn periodic_ticks_until_cancelled() {
        let scheduler = AutoSaveScheduler::new();
        let (count, task) = counter();
        scheduler.every(Duration::from_secs(30), task);

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(32)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        scheduler.cancel_all();
        tokio::time::sleep(Duration::from_secs(90)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!scheduler.is_periodic_running());
    }

    #[test]
    fn outside_a_runtime_nothing_is_scheduled() {
        let scheduler = AutoSaveScheduler::new();
        let (count, task) = counter();
        scheduler.debounce(Duration::ZERO, task);
        assert!(!scheduler.debounce_pending());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }
}

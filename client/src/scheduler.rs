use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// A deferred, cancellable piece of work.
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Timer source for the connection manager.
///
/// Reconnect delays and request timeouts all go through this trait so tests
/// can drive them deterministically with a [`ManualScheduler`] instead of
/// waiting on wall-clock time.
pub trait Scheduler: Send + Sync + 'static {
    /// Run `task` once after `delay`, unless the returned guard cancels it.
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerGuard;
}

/// Cancellation handle for a scheduled timer. Dropping the guard cancels
/// the timer; call [`detach`](TimerGuard::detach) to let it fire unowned.
pub struct TimerGuard {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl TimerGuard {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancel the timer if it has not fired yet.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Forget the guard without cancelling; the timer fires on schedule.
    pub fn detach(mut self) {
        self.cancel.take();
    }
}

impl Drop for TimerGuard {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for TimerGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerGuard")
            .field("armed", &self.cancel.is_some())
            .finish()
    }
}

/// Production scheduler backed by `tokio::time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerGuard {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
        let abort = handle.abort_handle();
        TimerGuard::new(move || abort.abort())
    }
}

/// Test scheduler whose timers only fire when told to.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<ManualInner>>,
}

#[derive(Default)]
struct ManualInner {
    next_id: u64,
    pending: Vec<(u64, Duration, TimerTask)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ManualInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of timers currently armed.
    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    /// Fire the oldest armed timer. Returns `false` when none is armed.
    pub fn fire_next(&self) -> bool {
        let task = {
            let mut inner = self.lock();
            if inner.pending.is_empty() {
                return false;
            }
            let (_, _, task) = inner.pending.remove(0);
            task
        };
        task();
        true
    }

    /// Fire every timer armed at the moment of the call, in scheduling
    /// order. Timers armed by the fired tasks themselves stay pending.
    pub fn fire_all(&self) {
        let tasks: Vec<TimerTask> = {
            let mut inner = self.lock();
            std::mem::take(&mut inner.pending)
                .into_iter()
                .map(|(_, _, task)| task)
                .collect()
        };
        for task in tasks {
            task();
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: TimerTask) -> TimerGuard {
        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.pending.push((id, delay, task));
            id
        };
        let scheduler = self.clone();
        TimerGuard::new(move || {
            let mut inner = scheduler.lock();
            inner.pending.retain(|(timer_id, _, _)| *timer_id != id);
        })
    }
}

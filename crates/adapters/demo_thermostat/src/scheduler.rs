//! Delayed one-shot work.
//!
//! Thermostats never touch a runtime directly: every delay (convergence of
//! the current temperature, latency of the connectivity probe) goes through
//! a [`Scheduler`] injected at hub construction.
//!
//! - [`TokioScheduler`] spawns onto a tokio runtime and sleeps with
//!   `tokio::time`, so it also honours a paused test clock.
//! - [`ManualScheduler`] is a deterministic fake clock: nothing fires until
//!   [`ManualScheduler::advance`] moves virtual time past the due time.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::error::DemoError;

/// A unit of work run once its delay has elapsed.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Future returned by [`Scheduler::sleep`].
pub type Sleep = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Runs tasks after a delay.
///
/// Scheduled tasks cannot be cancelled; they run to completion once due.
pub trait Scheduler: Send + Sync {
    /// Run `task` once `delay` has elapsed. Returns immediately.
    fn schedule(&self, delay: Duration, task: Task);

    /// Suspend for `duration` on this scheduler's clock.
    ///
    /// The default implementation schedules a task that completes a oneshot
    /// channel. If the scheduler drops the task without running it, the
    /// sleep completes early.
    fn sleep(&self, duration: Duration) -> Sleep {
        let (tx, rx) = oneshot::channel();
        self.schedule(
            duration,
            Box::new(move || {
                let _ = tx.send(());
            }),
        );
        Box::pin(async move {
            let _ = rx.await;
        })
    }
}

/// Scheduler backed by a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: Handle,
}

impl TokioScheduler {
    #[must_use]
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Use the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Returns [`DemoError::NoRuntime`] when called outside a tokio runtime.
    pub fn current() -> Result<Self, DemoError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|_| DemoError::NoRuntime)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        // The join handle is dropped on purpose: the task stays detached.
        self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            task();
        });
    }

    fn sleep(&self, duration: Duration) -> Sleep {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Deterministic scheduler driven by explicit calls to [`advance`](Self::advance).
///
/// Tasks fire in due-time order; tasks due at the same instant fire in the
/// order they were scheduled. A task scheduled while another one is running
/// is due relative to the running task's due time.
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    pending: BTreeMap<(Duration, u64), Task>,
}

impl ManualScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Virtual time elapsed since creation.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.lock().now
    }

    /// Number of scheduled tasks that have not fired yet.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lock().pending.len()
    }

    /// Move virtual time forward by `by`, running every task that becomes
    /// due on the way. Returns how many tasks ran.
    ///
    /// Tasks run on the calling thread with no lock held, so they may
    /// schedule further work; that work also runs if it falls due before the
    /// end of this advance.
    pub fn advance(&self, by: Duration) -> usize {
        let target = self.lock().now.saturating_add(by);
        let mut fired = 0;
        loop {
            let next = {
                let mut state = self.lock();
                let first = state.pending.first_key_value().map(|(key, _)| *key);
                match first {
                    Some(key) if key.0 <= target => {
                        state.now = key.0;
                        state.pending.remove(&key)
                    }
                    _ => {
                        state.now = target;
                        None
                    }
                }
            };
            let Some(task) = next else { break };
            task();
            fired += 1;
        }
        fired
    }

    fn lock(&self) -> MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) {
        let mut state = self.lock();
        let due = state.now.saturating_add(delay);
        let seq = state.next_seq;
        state.next_seq += 1;
        state.pending.insert((due, seq), task);
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("pending", &state.pending.len())
            .finish()
    }
}

//! Change observers attached to a thermostat.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A zero-argument callback invoked when a thermostat's state changes.
///
/// Identity is the identity of the underlying allocation: clones of an
/// `Observer` are equal to each other, two observers built from separate
/// closures never are.
#[derive(Clone)]
pub struct Observer(Arc<dyn Fn() + Send + Sync>);

impl Observer {
    pub fn new(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    pub fn notify(&self) {
        (self.0)();
    }

    fn addr(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

impl PartialEq for Observer {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.addr(), other.addr())
    }
}

impl Eq for Observer {}

impl Hash for Observer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl std::fmt::Debug for Observer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Observer").field(&self.addr()).finish()
    }
}

/// Set of observers, notified from a snapshot taken outside the lock.
#[derive(Debug, Default)]
pub(crate) struct ObserverRegistry {
    observers: Mutex<HashSet<Observer>>,
}

impl ObserverRegistry {
    /// Returns `false` if the observer was already registered.
    pub(crate) fn register(&self, observer: Observer) -> bool {
        self.lock().insert(observer)
    }

    /// Returns `false` if the observer was not registered.
    pub(crate) fn remove(&self, observer: &Observer) -> bool {
        self.lock().remove(observer)
    }

    pub(crate) fn len(&self) -> usize {
        self.lock().len()
    }

    /// Invoke every observer registered at the time of the call.
    ///
    /// Callbacks run after the lock is released, so a callback may register
    /// or remove observers (including itself); such changes take effect on
    /// the next notification.
    pub(crate) fn notify_all(&self) -> usize {
        let snapshot: Vec<Observer> = self.lock().iter().cloned().collect();
        for observer in &snapshot {
            observer.notify();
        }
        snapshot.len()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<Observer>> {
        self.observers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

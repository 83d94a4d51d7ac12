//! Change notification (observer pattern).
//!
//! A [`Notifier`] keeps a list of `Weak` references to registered
//! [`ChangeObserver`]s and calls [`ChangeObserver::changed`] on each live one
//! when its owner changes state.  The parameter store embeds one so that
//! caches outside the library can react to parameter writes.
//!
//! The list sits behind a `Mutex` so that registration and notification work
//! through `&self` on values shared across threads.

use std::sync::{Arc, Mutex, Weak};

/// An object that reacts to changes of the values it subscribed to.
pub trait ChangeObserver: Send + Sync {
    /// Called after the observed value changed.
    ///
    /// `name` identifies what changed (e.g. the parameter name).
    fn changed(&self, name: &str);
}

/// Embeddable observer-list management.
pub struct Notifier {
    observers: Mutex<Vec<Weak<dyn ChangeObserver>>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.len())
            .finish()
    }
}

impl Notifier {
    /// Create a notifier with no observers.
    pub fn new() -> Self {
        Self {
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Register an observer.
    pub fn register(&self, observer: Weak<dyn ChangeObserver>) {
        self.observers
            .lock()
            .expect("Notifier mutex poisoned")
            .push(observer);
    }

    /// Remove an observer (by pointer equality of the `Weak`).
    pub fn unregister(&self, observer: &Weak<dyn ChangeObserver>) {
        self.observers
            .lock()
            .expect("Notifier mutex poisoned")
            .retain(|o| !Weak::ptr_eq(o, observer));
    }

    /// Number of registered observers, dead ones included.
    pub fn len(&self) -> usize {
        self.observers.lock().expect("Notifier mutex poisoned").len()
    }

    /// Whether no observer is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Notify all live observers, pruning dead `Weak` references.
    pub fn notify(&self, name: &str) {
        // Collect live observers under the lock, call them outside it so that
        // an observer may register further observers.
        let live: Vec<Arc<dyn ChangeObserver>> = {
            let mut guard = self.observers.lock().expect("Notifier mutex poisoned");
            guard.retain(|w| w.strong_count() > 0);
            guard.iter().filter_map(|w| w.upgrade()).collect()
        };
        for obs in live {
            obs.changed(name);
        }
    }
}

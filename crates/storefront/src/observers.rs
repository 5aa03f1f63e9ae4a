//! Publish/subscribe registry used by the cart and wishlist stores.
//!
//! Observers are called synchronously, in registration order, on the
//! caller's stack. The registry lock is released before any callback runs,
//! so a callback may unsubscribe itself or register another observer.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<T: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

/// A list of callbacks interested in values of type `T`.
pub struct Observers<T: ?Sized + 'static> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T: ?Sized + 'static> Default for Observers<T> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }
}

impl<T: ?Sized + 'static> fmt::Debug for Observers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observers")
            .field("len", &self.len())
            .finish()
    }
}

impl<T: ?Sized + 'static> Observers<T> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Keep the returned [`Subscription`] to remove it
    /// later; dropping the handle leaves the callback registered.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.entries.push((id, Arc::new(callback)));
            id
        };

        let weak: Weak<Mutex<Registry<T>>> = Arc::downgrade(&self.registry);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(registry) = weak.upgrade() {
                    registry
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .entries
                        .retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    /// Invoke every registered callback with `value`.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            callback(value);
        }
    }

    /// Number of registered callbacks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    /// Returns `true` if nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by [`Observers::subscribe`].
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Remove the callback. Safe to call after the store is gone.
    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_in_registration_order() {
        let observers: Observers<str> = Observers::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        let _a = observers.subscribe(move |v: &str| first.lock().unwrap().push(format!("a:{v}")));
        let second = Arc::clone(&seen);
        let _b = observers.subscribe(move |v: &str| second.lock().unwrap().push(format!("b:{v}")));

        observers.notify("x");
        assert_eq!(*seen.lock().unwrap(), vec!["a:x", "b:x"]);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let observers: Observers<u32> = Observers::new();
        let count = Arc::new(Mutex::new(0));

        let counter = Arc::clone(&count);
        let sub = observers.subscribe(move |_| *counter.lock().unwrap() += 1);
        observers.notify(&1);
        sub.unsubscribe();
        observers.notify(&2);

        assert_eq!(*count.lock().unwrap(), 1);
        assert!(observers.is_empty());
    }

    #[test]
    fn test_dropping_handle_keeps_observer() {
        let observers: Observers<u32> = Observers::new();
        drop(observers.subscribe(|_| {}));
        assert_eq!(observers.len(), 1);
    }

    #[test]
    fn test_unsubscribe_after_registry_dropped() {
        let observers: Observers<u32> = Observers::new();
        let sub = observers.subscribe(|_| {});
        drop(observers);
        sub.unsubscribe();
    }

    #[test]
    fn test_callback_may_subscribe_during_notify() {
        let observers: Arc<Observers<u32>> = Arc::new(Observers::new());
        let inner = Arc::clone(&observers);
        let _sub = observers.subscribe(move |_| {
            drop(inner.subscribe(|_| {}));
        });

        observers.notify(&0);
        assert_eq!(observers.len(), 2);
    }
}

//! Explicit subscription interface for state-change notifications.
//!
//! A consumer registers a callback and receives a [`Subscription`] guard; the
//! callback stays registered until the guard is dropped or
//! [`Subscription::unsubscribe`] is called.

use std::sync::{Arc, Mutex, Weak};

type Callback<E> = Arc<Mutex<dyn FnMut(&E) + Send>>;

struct Registry<E> {
    next_id: u64,
    entries: Vec<(u64, Callback<E>)>,
}

/// Set of callbacks interested in events of type `E`.
pub struct Subscribers<E> {
    inner: Arc<Mutex<Registry<E>>>,
}

impl<E: 'static> Subscribers<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    /// Register `callback`. Changes made from inside a callback take effect
    /// from the next notification.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&E) + Send + 'static,
    {
        let mut registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Arc::new(Mutex::new(callback))));

        let weak: Weak<Mutex<Registry<E>>> = Arc::downgrade(&self.inner);
        Subscription {
            remove: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    let mut registry = inner.lock().unwrap_or_else(|e| e.into_inner());
                    registry.entries.retain(|(entry_id, _)| *entry_id != id);
                }
            })),
        }
    }

    /// Invoke every callback, in subscription order. The registry is not
    /// locked while callbacks run.
    pub fn notify(&self, event: &E) {
        let callbacks: Vec<Callback<E>> = {
            let registry = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            registry.entries.iter().map(|(_, cb)| cb.clone()).collect()
        };
        for entry in callbacks {
            let mut callback = entry.lock().unwrap_or_else(|e| e.into_inner());
            (*callback)(event);
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<E: 'static> Default for Subscribers<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for Subscribers<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .inner
            .lock()
            .map(|r| r.entries.len())
            .unwrap_or_default();
        f.debug_struct("Subscribers").field("count", &count).finish()
    }
}

/// Guard for a registered callback. Unregisters on drop.
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
    remove: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.remove.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callbacks_run_in_subscription_order() {
        let subs = Subscribers::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let a = {
            let seen = seen.clone();
            subs.subscribe(move |e| seen.lock().unwrap().push(("a", *e)))
        };
        let b = {
            let seen = seen.clone();
            subs.subscribe(move |e| seen.lock().unwrap().push(("b", *e)))
        };

        subs.notify(&7);
        assert_eq!(*seen.lock().unwrap(), vec![("a", 7), ("b", 7)]);
        drop((a, b));
    }

    #[test]
    fn dropping_guard_unsubscribes() {
        let subs = Subscribers::<()>::new();
        let hits = Arc::new(Mutex::new(0));

        let guard = {
            let hits = hits.clone();
            subs.subscribe(move |_| *hits.lock().unwrap() += 1)
        };
        subs.notify(&());
        assert_eq!(subs.len(), 1);

        drop(guard);
        subs.notify(&());
        assert!(subs.is_empty());
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn explicit_unsubscribe_only_removes_its_own_callback() {
        let subs = Subscribers::<()>::new();
        let first = subs.subscribe(|_| {});
        let _second = subs.subscribe(|_| {});
        first.unsubscribe();
        assert_eq!(subs.len(), 1);
    }

    #[test]
    fn callback_can_drop_a_subscription() {
        let subs = Subscribers::<()>::new();
        let hits = Arc::new(Mutex::new(0));
        let other = subs.subscribe({
            let hits = hits.clone();
            move |_| *hits.lock().unwrap() += 1
        });
        let slot = Arc::new(Mutex::new(Some(other)));
        let _first = subs.subscribe({
            let slot = slot.clone();
            move |_| drop(slot.lock().unwrap().take())
        });

        subs.notify(&());
        assert_eq!(subs.len(), 1);
        subs.notify(&());
        assert_eq!(*hits.lock().unwrap(), 1);
    }

    #[test]
    fn callback_can_subscribe() {
        let subs = Arc::new(Subscribers::<()>::new());
        let added = Arc::new(Mutex::new(Vec::new()));
        let _guard = subs.subscribe({
            let subs = subs.clone();
            let added = added.clone();
            move |_| added.lock().unwrap().push(subs.subscribe(|_| {}))
        });

        subs.notify(&());
        assert_eq!(subs.len(), 2);
    }

    #[test]
    fn guard_outliving_registry_is_harmless() {
        let subs = Subscribers::<()>::new();
        let guard = subs.subscribe(|_| {});
        drop(subs);
        drop(guard);
    }
}

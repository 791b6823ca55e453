//! Observable single-copy state container.
//!
//! `set` merges an update into the canonical value and then notifies every
//! subscriber synchronously with a snapshot. The lock is released before
//! listeners run, so a listener may read (or even update) the same store.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct StoreInner<T> {
    state: T,
    next_listener_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

pub struct Store<T> {
    inner: Arc<Mutex<StoreInner<T>>>,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

fn lock<T>(inner: &Mutex<StoreInner<T>>) -> MutexGuard<'_, StoreInner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T> Store<T>
where
    T: Clone + Send + 'static,
{
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                state: initial,
                next_listener_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn get(&self) -> T {
        lock(&self.inner).state.clone()
    }

    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&lock(&self.inner).state)
    }

    pub fn set(&self, update: impl FnOnce(&mut T)) {
        let (snapshot, listeners) = {
            let mut inner = lock(&self.inner);
            update(&mut inner.state);
            let listeners: Vec<Listener<T>> = inner
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            (inner.state.clone(), listeners)
        };

        for listener in listeners {
            listener(&snapshot);
        }
    }

    pub fn replace(&self, state: T) {
        self.set(move |current| *current = state);
    }

    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let listener: Listener<T> = Arc::new(listener);
        let id = {
            let mut inner = lock(&self.inner);
            let id = inner.next_listener_id;
            inner.next_listener_id = inner.next_listener_id.wrapping_add(1);
            inner.listeners.push((id, listener));
            id
        };

        let weak: Weak<Mutex<StoreInner<T>>> = Arc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                let mut inner = lock(&inner);
                if let Some(idx) = inner.listeners.iter().position(|(lid, _)| *lid == id) {
                    inner.listeners.remove(idx);
                }
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.inner).listeners.len()
    }
}

/// Handle that removes one registration when [`Subscription::unsubscribe`] runs.
///
/// Dropping the handle does not unregister anything; teardown is explicit.
#[must_use = "a subscription stays registered until `unsubscribe` is called"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn noop() -> Self {
        Self { teardown: None }
    }

    pub fn unsubscribe(mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.teardown.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;

//! Change listener registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Handle returned on subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type AddedFn<T> = Arc<dyn Fn(&T) + Send + Sync>;
type RemovedFn<T> = Arc<dyn Fn(&[T]) + Send + Sync>;
type ChangedFn = Arc<dyn Fn() + Send + Sync>;

enum Listener<T> {
    Added(AddedFn<T>),
    Removed(RemovedFn<T>),
    Changed(ChangedFn),
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        match self {
            Listener::Added(f) => Listener::Added(f.clone()),
            Listener::Removed(f) => Listener::Removed(f.clone()),
            Listener::Changed(f) => Listener::Changed(f.clone()),
        }
    }
}

/// Listeners are invoked synchronously in registration order. Dispatch runs over a
/// snapshot, so a callback may subscribe or unsubscribe without deadlocking; the
/// change takes effect from the next event.
pub struct ChangeListeners<T> {
    listeners: RwLock<Vec<(ListenerId, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T> ChangeListeners<T> {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn register(&self, listener: Listener<T>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    pub fn on_added<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.register(Listener::Added(Arc::new(f)))
    }

    pub fn on_removed<F>(&self, f: F) -> ListenerId
    where
        F: Fn(&[T]) + Send + Sync + 'static,
    {
        self.register(Listener::Removed(Arc::new(f)))
    }

    pub fn on_change<F>(&self, f: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.register(Listener::Changed(Arc::new(f)))
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let len = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() < len
    }

    pub fn count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn snapshot(&self) -> Vec<Listener<T>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| l.clone())
            .collect()
    }

    pub(crate) fn emit_added(&self, object: &T) {
        for listener in self.snapshot() {
            match listener {
                Listener::Added(f) => f(object),
                Listener::Changed(f) => f(),
                Listener::Removed(_) => {}
            }
        }
    }

    pub(crate) fn emit_removed(&self, objects: &[T]) {
        if objects.is_empty() {
            return;
        }
        for listener in self.snapshot() {
            match listener {
                Listener::Removed(f) => f(objects),
                Listener::Changed(f) => f(),
                Listener::Added(_) => {}
            }
        }
    }

    /// One change: removed listeners see `previous`, then added listeners see
    /// `current`. Change listeners run once.
    pub(crate) fn emit_replaced(&self, previous: &T, current: &T) {
        let listeners = self.snapshot();
        for listener in &listeners {
            match listener {
                Listener::Removed(f) => f(std::slice::from_ref(previous)),
                Listener::Changed(f) => f(),
                Listener::Added(_) => {}
            }
        }
        for listener in &listeners {
            if let Listener::Added(f) = listener {
                f(current);
            }
        }
    }
}

impl<T> Default for ChangeListeners<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ChangeListeners<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeListeners")
            .field("count", &self.count())
            .finish()
    }
}

// ── Observable single-value store ──
//
// One current value, synchronous listeners called in registration
// order on every `set`, plus `watch` receivers for async consumers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::trace;

use super::sequence::{RequestSequencer, Ticket};

/// Handle returned by [`Store::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A named, observable value.
///
/// Listeners run on the thread that called `set`, after the new value is
/// visible to `get`. No lock is held while they run, so a listener may
/// write to this or any other store.
pub struct Store<T> {
    name: &'static str,
    value: watch::Sender<T>,
    listeners: Mutex<Vec<(ListenerId, Listener<T>)>>,
    next_id: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> Store<T> {
    pub fn new(name: &'static str, initial: T) -> Self {
        let (value, _) = watch::channel(initial);
        Self {
            name,
            value,
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Clone of the current value.
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }

    /// Borrow the current value without cloning it.
    ///
    /// Do not call `set` on the same store from inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }

    /// Replace the value and notify every listener.
    pub fn set(&self, value: T) {
        trace!(store = self.name, "set");
        self.value.send_replace(value.clone());
        self.notify(&value);
    }

    /// Replace the value unless `sequencer` already applied a response
    /// from a newer ticket. Returns whether the write happened.
    pub fn set_if_newer(&self, sequencer: &RequestSequencer, ticket: Ticket, value: T) -> bool {
        let written = self.value.send_if_modified(|slot| {
            if sequencer.try_apply(ticket) {
                *slot = value.clone();
                true
            } else {
                false
            }
        });
        if written {
            trace!(store = self.name, ticket = ticket.get(), "set from newest response");
            self.notify(&value);
        } else {
            trace!(store = self.name, ticket = ticket.get(), "stale response discarded");
        }
        written
    }

    /// Register a listener for future `set` calls.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(listener)));
        id
    }

    /// Register a listener and call it once with the current value.
    pub fn subscribe_immediate(
        &self,
        listener: impl Fn(&T) + Send + Sync + 'static,
    ) -> ListenerId {
        let listener: Listener<T> = Arc::new(listener);
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::clone(&listener)));
        let current = self.get();
        listener(&current);
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.lock().len()
    }

    /// Async receiver; `changed()` fires on every `set`.
    pub fn watch(&self) -> watch::Receiver<T> {
        self.value.subscribe()
    }

    fn notify(&self, value: &T) {
        // Snapshot so listeners can (un)subscribe or set re-entrantly.
        let listeners: Vec<Listener<T>> = self.lock().iter().map(|(_, l)| Arc::clone(l)).collect();
        for listener in listeners {
            listener(value);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(ListenerId, Listener<T>)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Store<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .field("value", &*self.value.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn listeners_fire_in_registration_order() {
        let store = Store::new("n", 0u32);
        let log = Arc::new(Mutex::new(Vec::new()));
        for tag in ["a", "b"] {
            let log = Arc::clone(&log);
            store.subscribe(move |v| log.lock().unwrap().push(format!("{tag}{v}")));
        }
        store.set(1);
        store.set(1);
        assert_eq!(*log.lock().unwrap(), ["a1", "b1", "a1", "b1"]);
    }

    #[test]
    fn subscribe_immediate_sees_current_value() {
        let store = Store::new("n", 7u32);
        let seen = Arc::new(Mutex::new(None));
        let s = Arc::clone(&seen);
        store.subscribe_immediate(move |v| *s.lock().unwrap() = Some(*v));
        assert_eq!(*seen.lock().unwrap(), Some(7));
    }

    #[test]
    fn listener_may_write_other_stores() {
        let a = Arc::new(Store::new("a", 0u32));
        let b = Arc::new(Store::new("b", 0u32));
        let b2 = Arc::clone(&b);
        a.subscribe(move |v| b2.set(v * 10));
        a.set(4);
        assert_eq!(b.get(), 40);
    }

    #[test]
    fn listener_may_write_its_own_store() {
        let a = Arc::new(Store::new("a", 0u32));
        let a2 = Arc::clone(&a);
        a.subscribe(move |v| {
            if *v < 3 {
                a2.set(v + 1);
            }
        });
        a.set(0);
        assert_eq!(a.get(), 3);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let store = Store::new("n", 0u32);
        let hits = Arc::new(AtomicU64::new(0));
        let h = Arc::clone(&hits);
        let id = store.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        });
        store.set(1);
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set(2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stale_ticket_does_not_write() {
        let store = Store::new("n", "initial".to_owned());
        let seq = RequestSequencer::new();
        let old = seq.issue();
        let new = seq.issue();
        assert!(store.set_if_newer(&seq, new, "new".into()));
        assert!(!store.set_if_newer(&seq, old, "old".into()));
        assert_eq!(store.get(), "new");
    }

    #[test]
    fn older_ticket_writes_when_newer_never_landed() {
        let store = Store::new("n", "initial".to_owned());
        let seq = RequestSequencer::new();
        let old = seq.issue();
        let _failed = seq.issue();
        assert!(store.set_if_newer(&seq, old, "old".into()));
        assert_eq!(store.get(), "old");
    }

    #[tokio::test]
    async fn watch_receivers_observe_sets() {
        let store = Store::new("n", false);
        let mut rx = store.watch();
        store.set(true);
        rx.changed().await.unwrap();
        assert!(*rx.borrow_and_update());
    }
}

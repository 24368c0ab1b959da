//! Minimal observer list, decoupled from whatever raises the events

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

/// Handle returned by [`Signal::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Signal fans an event out to every subscribed listener
pub struct Signal<E> {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener<E>)>>,
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            listeners: Mutex::new(Vec::new()),
        }
    }
}

impl<E> Signal<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    /// Returns whether the subscription was still registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Calls every listener in subscription order
    ///
    /// The listener list is copied out first, so listeners may subscribe or
    /// unsubscribe while being notified.
    pub fn emit(&self, event: &E) {
        let listeners: Vec<Listener<E>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in listeners {
            listener(event);
        }
    }
}

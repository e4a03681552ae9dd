//! Crossing Bus
//!
//! Synchronous publish/subscribe for crossing events. Every listener sees
//! every event exactly once, in publication order. Listeners run on the
//! publishing thread while the rider's update is still held, so they should
//! hand work off rather than block (the async service does exactly that).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::monitor::events::CrossingEvent;

/// Handle returned by [`CrossingBus::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(u64);

/// A crossing listener.
pub type CrossingListener = Arc<dyn Fn(&CrossingEvent) + Send + Sync>;

/// Fan-out of crossing events to registered listeners.
#[derive(Default)]
pub struct CrossingBus {
    listeners: RwLock<BTreeMap<ListenerId, CrossingListener>>,
    next_id: AtomicU64,
}

impl CrossingBus {
    /// Create a bus with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. Listeners are called in registration order.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&CrossingEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().insert(id, Arc::new(listener));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.write().remove(&id).is_some()
    }

    /// Deliver an event to every listener.
    pub fn publish(&self, event: &CrossingEvent) {
        // Snapshot so a listener may (un)subscribe without deadlocking
        let listeners: Vec<CrossingListener> = self.listeners.read().values().cloned().collect();
        for listener in listeners {
            listener(event);
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl std::fmt::Debug for CrossingBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossingBus")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

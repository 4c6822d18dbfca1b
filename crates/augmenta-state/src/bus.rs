//! Event bus
//!
//! Delivers each event to every current subscriber, synchronously and in
//! publication order. There is no buffering: `publish` returns once every
//! handler has run. Handlers are called without any bus lock held, so a
//! handler may subscribe, unsubscribe or query the session.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use augmenta_core::SceneEvent;
use parking_lot::RwLock;

type Handler = Arc<dyn Fn(&SceneEvent) + Send + Sync>;

/// Handle returned by [`EventBus::subscribe`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SubscriptionId(u64);

/// Synchronous, ordered subscriber list
pub struct EventBus {
    subscribers: RwLock<Vec<(SubscriptionId, Handler)>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a handler. Handlers run in subscription order.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&SceneEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler; returns whether it was registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Deliver `event` to every subscriber; returns how many were notified
    pub fn publish(&self, event: &SceneEvent) -> usize {
        let handlers: Vec<Handler> = self
            .subscribers
            .read()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        EventBus::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use augmenta_core::{Entity, EventKind, ObjectId, Scene};
    use parking_lot::Mutex;

    #[test]
    fn test_delivers_in_order_to_all_subscribers() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |event| seen.lock().push((tag, event.kind())));
        }

        bus.publish(&SceneEvent::ObjectEntered(Entity::with_pid(ObjectId::new(1))));
        bus.publish(&SceneEvent::SceneUpdated(Scene::default()));

        assert_eq!(
            *seen.lock(),
            vec![
                ("a", EventKind::ObjectEntered),
                ("b", EventKind::ObjectEntered),
                ("a", EventKind::SceneUpdated),
                ("b", EventKind::SceneUpdated),
            ]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::new();
        let id = bus.subscribe(|_| {});
        assert_eq!(bus.subscriber_count(), 1);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert_eq!(bus.publish(&SceneEvent::SceneUpdated(Scene::default())), 0);
    }

    #[test]
    fn test_handler_may_resubscribe_during_publish() {
        let bus = Arc::new(EventBus::new());
        let inner = Arc::clone(&bus);
        bus.subscribe(move |_| {
            inner.subscribe(|_| {});
        });

        assert_eq!(bus.publish(&SceneEvent::SceneUpdated(Scene::default())), 1);
        assert_eq!(bus.subscriber_count(), 2);
    }
}

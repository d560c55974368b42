use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use tracing::warn;

use crate::models::User;

type Listener = Box<dyn Fn(&User) + Send>;

/// Publish/subscribe channel broadcasting newly created user records to
/// currently subscribed listeners.
///
/// Listeners are invoked synchronously in subscription order. A panicking
/// listener is caught and logged and does not block delivery to the
/// listeners behind it. Listeners must not subscribe or publish from inside
/// a delivery; the listener list is locked for the duration of `publish`.
///
/// Clone is cheap - clones share the same listener list, so the one instance
/// created at the application root can be handed to whatever needs to
/// publish or observe.
#[derive(Clone)]
pub struct CreationBus {
    inner: Arc<BusInner>,
}

struct BusInner {
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

impl BusInner {
    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        // Listener panics are caught inside publish, so the lock is only
        // poisoned by a bug in the bus itself; recover rather than cascade.
        match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn remove(&self, id: u64) {
        self.lock().retain(|(lid, _)| *lid != id);
    }
}

impl CreationBus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a listener. The returned subscription removes exactly this
    /// listener when unsubscribed. No listener limit, no deduplication.
    pub fn subscribe(&self, listener: impl Fn(&User) + Send + 'static) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.lock().push((id, Box::new(listener)));
        Subscription {
            bus: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Synchronously deliver the record to every registered listener, in
    /// subscription order.
    pub fn publish(&self, user: &User) {
        for (id, listener) in self.inner.lock().iter() {
            if catch_unwind(AssertUnwindSafe(|| listener(user))).is_err() {
                warn!(listener_id = *id, "Creation listener panicked; continuing delivery");
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().len()
    }
}

impl Default for CreationBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Capability to remove one registered listener.
pub struct Subscription {
    bus: Weak<BusInner>,
    id: u64,
}

impl Subscription {
    /// Remove the listener this subscription registered. Calling this more
    /// than once, or after the bus is gone, is a no-op.
    pub fn unsubscribe(&self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.id);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserDraft;
    use std::sync::Mutex as StdMutex;

    fn sample_user() -> User {
        UserDraft {
            name: "Ann".to_string(),
            username: "ann".to_string(),
            email: "ann@example.com".to_string(),
            phone: "555-0100".to_string(),
            website: "example.com".to_string(),
        }
        .into_user(1)
    }

    #[test]
    fn test_publish_reaches_listeners_in_subscription_order() {
        let bus = CreationBus::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let s1 = {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |u: &User| seen.lock().unwrap().push(format!("first:{}", u.id)))
        };
        let s2 = {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |u: &User| seen.lock().unwrap().push(format!("second:{}", u.id)))
        };

        bus.publish(&sample_user());

        assert_eq!(*seen.lock().unwrap(), vec!["first:1", "second:1"]);
        s1.unsubscribe();
        s2.unsubscribe();
    }

    #[test]
    fn test_unsubscribe_removes_only_that_listener() {
        let bus = CreationBus::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let s1 = {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |_: &User| seen.lock().unwrap().push("first"))
        };
        let _s2 = {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |_: &User| seen.lock().unwrap().push("second"))
        };

        s1.unsubscribe();
        bus.publish(&sample_user());

        assert_eq!(*seen.lock().unwrap(), vec!["second"]);
        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_double_unsubscribe_is_noop() {
        let bus = CreationBus::new();
        let _keep = bus.subscribe(|_: &User| {});
        let sub = bus.subscribe(|_: &User| {});

        sub.unsubscribe();
        sub.unsubscribe();

        assert_eq!(bus.listener_count(), 1);
    }

    #[test]
    fn test_panicking_listener_does_not_block_delivery() {
        let bus = CreationBus::new();
        let seen = Arc::new(StdMutex::new(Vec::new()));

        let _s1 = bus.subscribe(|_: &User| panic!("listener bug"));
        let _s2 = {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |u: &User| seen.lock().unwrap().push(u.name.clone()))
        };

        bus.publish(&sample_user());

        assert_eq!(*seen.lock().unwrap(), vec!["Ann"]);
    }

    #[test]
    fn test_publish_with_no_listeners_is_noop() {
        let bus = CreationBus::new();
        bus.publish(&sample_user());
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_clones_share_the_listener_list() {
        let bus = CreationBus::new();
        let other = bus.clone();
        let _sub = other.subscribe(|_: &User| {});
        assert_eq!(bus.listener_count(), 1);
    }
}

//! Notification bus
//!
//! Explicit observer lists for the two layout signals:
//!
//! - **changed**: value-less, fired by every effective state mutation
//! - **theme changed**: carries the new [`ThemeMode`]
//!
//! When one mutation produces both, [`NotificationBus::publish_theme_change`]
//! delivers every theme listener before any changed listener. Delivery is
//! synchronous on the caller's task and happens outside the listener lock, so
//! listeners may subscribe, unsubscribe or read layout state.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::types::ThemeMode;

type ChangedListener = Arc<dyn Fn() + Send + Sync>;
type ThemeListener = Arc<dyn Fn(ThemeMode) + Send + Sync>;

/// Identifier of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

/// A notification published on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    /// Generic "something changed"
    Changed,
    /// The theme mode changed to the carried value
    ThemeChanged(ThemeMode),
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    changed: Vec<(SubscriptionId, ChangedListener)>,
    theme: Vec<(SubscriptionId, ThemeListener)>,
}

impl Listeners {
    fn allocate(&mut self) -> SubscriptionId {
        self.next_id += 1;
        SubscriptionId(self.next_id)
    }

    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.changed.len() + self.theme.len();
        self.changed.retain(|(existing, _)| *existing != id);
        self.theme.retain(|(existing, _)| *existing != id);
        before != self.changed.len() + self.theme.len()
    }
}

/// Observer registry for layout notifications.
#[derive(Clone, Default)]
pub struct NotificationBus {
    listeners: Arc<Mutex<Listeners>>,
}

impl NotificationBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for the generic changed notification.
    pub fn subscribe_changed<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock();
        let id = listeners.allocate();
        listeners.changed.push((id, Arc::new(listener)));
        self.guard(id)
    }

    /// Register a listener for theme changes.
    pub fn subscribe_theme<F>(&self, listener: F) -> Subscription
    where
        F: Fn(ThemeMode) + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock();
        let id = listeners.allocate();
        listeners.theme.push((id, Arc::new(listener)));
        self.guard(id)
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.lock().remove(id)
    }

    /// Number of registered listeners, both kinds.
    pub fn listener_count(&self) -> usize {
        let listeners = self.listeners.lock();
        listeners.changed.len() + listeners.theme.len()
    }

    /// Deliver a single notification.
    pub fn publish(&self, notification: Notification) {
        match notification {
            Notification::Changed => self.notify_changed(),
            Notification::ThemeChanged(mode) => self.notify_theme(mode),
        }
    }

    /// Deliver the changed notification to every changed listener.
    pub fn notify_changed(&self) {
        let snapshot: Vec<ChangedListener> = self
            .listeners
            .lock()
            .changed
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        tracing::trace!(listeners = snapshot.len(), "layout changed");
        for listener in snapshot {
            listener();
        }
    }

    /// Deliver a theme notification to every theme listener.
    pub fn notify_theme(&self, mode: ThemeMode) {
        let snapshot: Vec<ThemeListener> = self
            .listeners
            .lock()
            .theme
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        tracing::trace!(listeners = snapshot.len(), %mode, "theme changed");
        for listener in snapshot {
            listener(mode);
        }
    }

    /// Deliver a theme change: all theme listeners first, then all changed
    /// listeners.
    pub fn publish_theme_change(&self, mode: ThemeMode) {
        self.notify_theme(mode);
        self.notify_changed();
    }

    fn guard(&self, id: SubscriptionId) -> Subscription {
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }
}

impl fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.lock();
        f.debug_struct("NotificationBus")
            .field("changed", &listeners.changed.len())
            .field("theme", &listeners.theme.len())
            .finish()
    }
}

/// Registration guard. Dropping it unsubscribes the listener.
#[must_use = "dropping a Subscription unsubscribes its listener"]
pub struct Subscription {
    id: SubscriptionId,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    /// Identifier of the registered listener.
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Keep the listener registered for the lifetime of the bus.
    pub fn detach(mut self) -> SubscriptionId {
        self.listeners = Weak::new();
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().remove(self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recorder() -> (Arc<Mutex<Vec<String>>>, NotificationBus) {
        (Arc::new(Mutex::new(Vec::new())), NotificationBus::new())
    }

    #[test]
    fn theme_change_fires_theme_before_changed() {
        let (log, bus) = recorder();
        let changed_log = Arc::clone(&log);
        let theme_log = Arc::clone(&log);

        // Registration order is the opposite of delivery order on purpose.
        let _changed = bus.subscribe_changed(move || changed_log.lock().push("changed".into()));
        let _theme =
            bus.subscribe_theme(move |mode| theme_log.lock().push(format!("theme:{mode}")));

        bus.publish_theme_change(ThemeMode::Light);

        assert_eq!(*log.lock(), vec!["theme:Light", "changed"]);
    }

    #[test]
    fn dropping_subscription_unsubscribes() {
        let bus = NotificationBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let sub = bus.subscribe_changed(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        bus.notify_changed();
        drop(sub);
        bus.notify_changed();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn detached_subscription_stays_registered() {
        let bus = NotificationBus::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);

        let id = bus
            .subscribe_changed(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .detach();
        bus.notify_changed();
        bus.notify_changed();
        assert_eq!(count.load(Ordering::SeqCst), 2);

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
    }

    #[test]
    fn listener_may_subscribe_during_delivery() {
        let bus = NotificationBus::new();
        let inner_bus = bus.clone();
        let nested = Arc::new(Mutex::new(Vec::new()));
        let nested_store = Arc::clone(&nested);

        let _outer = bus.subscribe_changed(move || {
            let sub = inner_bus.subscribe_changed(|| {});
            nested_store.lock().push(sub);
        });

        bus.notify_changed();
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn publish_dispatches_by_kind() {
        let (log, bus) = recorder();
        let theme_log = Arc::clone(&log);
        let _theme = bus.subscribe_theme(move |mode| theme_log.lock().push(mode.to_string()));

        bus.publish(Notification::Changed);
        bus.publish(Notification::ThemeChanged(ThemeMode::System));

        assert_eq!(*log.lock(), vec!["System"]);
    }
}

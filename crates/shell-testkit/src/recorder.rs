//! Notification recorder

use parking_lot::Mutex;
use shell_core::{LayoutRecord, Notification, Subscription};
use std::sync::Arc;

/// Records every notification a record publishes, in delivery order.
pub struct EventRecorder {
    events: Arc<Mutex<Vec<Notification>>>,
    _theme: Subscription,
    _changed: Subscription,
}

impl EventRecorder {
    /// Start recording `record`'s notifications.
    pub fn attach(record: &LayoutRecord) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let theme = {
            let events = Arc::clone(&events);
            record.subscribe_theme(move |mode| events.lock().push(Notification::ThemeChanged(mode)))
        };
        let changed = {
            let events = Arc::clone(&events);
            record.subscribe_changed(move || events.lock().push(Notification::Changed))
        };
        Self {
            events,
            _theme: theme,
            _changed: changed,
        }
    }

    /// Recorded notifications, oldest first.
    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().clone()
    }

    /// Number of changed notifications recorded.
    pub fn changed_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, Notification::Changed))
            .count()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

//! Layout state record
//!
//! [`LayoutRecord`] is a cloneable handle to the shell's shared state. Every
//! field is read through an accessor and written through a setter; setters
//! publish on the record's [`NotificationBus`] after the field lock is
//! released.
//!
//! | Setter                     | Notifies                          |
//! |----------------------------|-----------------------------------|
//! | header, footer, profile    | changed, on every call            |
//! | navigation, profile menu   | changed, on every call            |
//! | sidebar                    | changed, only when the value flips|
//! | theme                      | theme then changed, only on change|

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

use crate::errors::LayoutResult;
use crate::nav::validate_navigation;
use crate::notify::{NotificationBus, Subscription};
use crate::types::{NavigationEntry, ProfileMenuEntry, ThemeMode};

/// Header title used until a host sets one.
pub const DEFAULT_TITLE: &str = "App";

/// Sidebar state used until a host (or a stored preference) sets one.
pub const DEFAULT_SIDEBAR_OPEN: bool = true;

/// Theme mode used until a host (or a stored preference) sets one.
pub const DEFAULT_THEME_MODE: ThemeMode = ThemeMode::Dark;

// ============================================================================
// LayoutState
// ============================================================================

/// Point-in-time copy of all layout fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutState {
    /// Header title
    pub title: String,
    /// Header subtitle
    pub subtitle: Option<String>,
    /// Navigation snapshot
    pub navigation: Arc<[NavigationEntry]>,
    /// Whether the sidebar is open
    pub sidebar_open: bool,
    /// Left footer text
    pub footer_left: Option<String>,
    /// Center footer text
    pub footer_center: Option<String>,
    /// Right footer text
    pub footer_right: Option<String>,
    /// Current theme mode
    pub theme_mode: ThemeMode,
    /// Display name of the signed-in user
    pub display_name: Option<String>,
    /// Avatar URL of the signed-in user
    pub profile_image_url: Option<String>,
    /// Profile menu snapshot
    pub profile_menu: Arc<[ProfileMenuEntry]>,
}

impl Default for LayoutState {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: None,
            navigation: Arc::from(Vec::new()),
            sidebar_open: DEFAULT_SIDEBAR_OPEN,
            footer_left: None,
            footer_center: None,
            footer_right: None,
            theme_mode: DEFAULT_THEME_MODE,
            display_name: None,
            profile_image_url: None,
            profile_menu: Arc::from(Vec::new()),
        }
    }
}

// ============================================================================
// LayoutRecord
// ============================================================================

struct RecordInner {
    state: RwLock<LayoutState>,
    bus: NotificationBus,
}

/// Shared, observable layout state.
///
/// Clones share the same state and bus. Mutations are expected to come from a
/// single logical owner; the internal lock only keeps individual field updates
/// consistent and is never held while listeners run.
#[derive(Clone)]
pub struct LayoutRecord {
    inner: Arc<RecordInner>,
}

impl Default for LayoutRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutRecord {
    /// Create a record holding the default state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RecordInner {
                state: RwLock::new(LayoutState::default()),
                bus: NotificationBus::new(),
            }),
        }
    }

    /// Notification bus of this record.
    pub fn bus(&self) -> &NotificationBus {
        &self.inner.bus
    }

    /// Register a listener for the generic changed notification.
    pub fn subscribe_changed<F>(&self, listener: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.bus.subscribe_changed(listener)
    }

    /// Register a listener for theme changes.
    pub fn subscribe_theme<F>(&self, listener: F) -> Subscription
    where
        F: Fn(ThemeMode) + Send + Sync + 'static,
    {
        self.inner.bus.subscribe_theme(listener)
    }

    /// Copy of every field.
    pub fn snapshot(&self) -> LayoutState {
        self.inner.state.read().clone()
    }

    /// Run `f` against the current state without copying it.
    pub fn with_state<R>(&self, f: impl FnOnce(&LayoutState) -> R) -> R {
        f(&self.inner.state.read())
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Header title.
    pub fn title(&self) -> String {
        self.with_state(|s| s.title.clone())
    }

    /// Header subtitle.
    pub fn subtitle(&self) -> Option<String> {
        self.with_state(|s| s.subtitle.clone())
    }

    /// Navigation snapshot.
    pub fn navigation(&self) -> Arc<[NavigationEntry]> {
        self.with_state(|s| Arc::clone(&s.navigation))
    }

    /// Whether the sidebar is open.
    pub fn is_sidebar_open(&self) -> bool {
        self.with_state(|s| s.sidebar_open)
    }

    /// Left footer text.
    pub fn footer_left(&self) -> Option<String> {
        self.with_state(|s| s.footer_left.clone())
    }

    /// Center footer text.
    pub fn footer_center(&self) -> Option<String> {
        self.with_state(|s| s.footer_center.clone())
    }

    /// Right footer text.
    pub fn footer_right(&self) -> Option<String> {
        self.with_state(|s| s.footer_right.clone())
    }

    /// Current theme mode.
    pub fn theme_mode(&self) -> ThemeMode {
        self.with_state(|s| s.theme_mode)
    }

    /// Display name of the signed-in user.
    pub fn display_name(&self) -> Option<String> {
        self.with_state(|s| s.display_name.clone())
    }

    /// Avatar URL of the signed-in user.
    pub fn profile_image_url(&self) -> Option<String> {
        self.with_state(|s| s.profile_image_url.clone())
    }

    /// Profile menu snapshot.
    pub fn profile_menu(&self) -> Arc<[ProfileMenuEntry]> {
        self.with_state(|s| Arc::clone(&s.profile_menu))
    }

    // ------------------------------------------------------------------------
    // Setters
    // ------------------------------------------------------------------------

    /// Set the header. An empty title is valid.
    pub fn set_header(&self, title: impl Into<String>, subtitle: Option<&str>) {
        let title = title.into();
        {
            let mut state = self.inner.state.write();
            state.title = title;
            state.subtitle = subtitle.map(str::to_string);
        }
        self.inner.bus.notify_changed();
    }

    /// Replace the navigation snapshot.
    ///
    /// The items are collected at call time. Fails without touching state
    /// when ids repeat or parents form a cycle.
    pub fn set_navigation<I>(&self, items: I) -> LayoutResult<()>
    where
        I: IntoIterator<Item = NavigationEntry>,
    {
        let snapshot: Arc<[NavigationEntry]> = items.into_iter().collect();
        validate_navigation(&snapshot)?;
        self.inner.state.write().navigation = snapshot;
        self.inner.bus.notify_changed();
        Ok(())
    }

    /// Set the footer texts.
    pub fn set_footer(&self, left: Option<&str>, center: Option<&str>, right: Option<&str>) {
        {
            let mut state = self.inner.state.write();
            state.footer_left = left.map(str::to_string);
            state.footer_center = center.map(str::to_string);
            state.footer_right = right.map(str::to_string);
        }
        self.inner.bus.notify_changed();
    }

    /// Set the profile fields.
    pub fn set_profile(&self, display_name: Option<&str>, image_url: Option<&str>) {
        {
            let mut state = self.inner.state.write();
            state.display_name = display_name.map(str::to_string);
            state.profile_image_url = image_url.map(str::to_string);
        }
        self.inner.bus.notify_changed();
    }

    /// Replace the profile menu snapshot. The items are collected at call time.
    pub fn set_profile_menu<I>(&self, items: I)
    where
        I: IntoIterator<Item = ProfileMenuEntry>,
    {
        let snapshot: Arc<[ProfileMenuEntry]> = items.into_iter().collect();
        self.inner.state.write().profile_menu = snapshot;
        self.inner.bus.notify_changed();
    }

    /// Open or close the sidebar. No notification when already in that state.
    pub fn set_sidebar_open(&self, open: bool) {
        {
            let mut state = self.inner.state.write();
            if state.sidebar_open == open {
                return;
            }
            state.sidebar_open = open;
        }
        self.inner.bus.notify_changed();
    }

    /// Flip the sidebar state.
    pub fn toggle_sidebar(&self) {
        self.set_sidebar_open(!self.is_sidebar_open());
    }

    /// Set the theme mode. No notification when already in that mode.
    pub fn set_theme_mode(&self, mode: ThemeMode) {
        {
            let mut state = self.inner.state.write();
            if state.theme_mode == mode {
                return;
            }
            state.theme_mode = mode;
        }
        self.inner.bus.publish_theme_change(mode);
    }

    /// Advance the theme along `System → Light → Dark → System`.
    pub async fn toggle_theme(&self) {
        self.set_theme_mode(self.theme_mode().next());
    }
}

impl fmt::Debug for LayoutRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutRecord")
            .field("state", &*self.inner.state.read())
            .field("bus", &self.inner.bus)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(record: &LayoutRecord) -> (Arc<AtomicUsize>, Subscription) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let sub = record.subscribe_changed(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (count, sub)
    }

    #[test]
    fn defaults_are_as_documented() {
        let record = LayoutRecord::new();
        let state = record.snapshot();

        assert_eq!(state.title, "App");
        assert_eq!(state.subtitle, None);
        assert!(state.navigation.is_empty());
        assert!(state.sidebar_open);
        assert_eq!(state.footer_left, None);
        assert_eq!(state.footer_center, None);
        assert_eq!(state.footer_right, None);
        assert_eq!(state.theme_mode, ThemeMode::Dark);
        assert_eq!(state.display_name, None);
        assert_eq!(state.profile_image_url, None);
        assert!(state.profile_menu.is_empty());
    }

    #[test]
    fn header_fires_changed_on_every_call() {
        let record = LayoutRecord::new();
        let (count, _sub) = counting(&record);

        record.set_header("Title", Some("Sub"));
        record.set_header("Title", Some("Sub"));
        record.set_header("", None);

        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert_eq!(record.title(), "");
        assert_eq!(record.subtitle(), None);
    }

    #[test]
    fn footer_and_profile_fire_changed_on_every_call() {
        let record = LayoutRecord::new();
        let (count, _sub) = counting(&record);

        record.set_footer(Some("l"), None, Some("r"));
        record.set_footer(Some("l"), None, Some("r"));
        record.set_profile(Some("Test user"), None);
        record.set_profile(Some("Test user"), None);

        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert_eq!(record.footer_left().as_deref(), Some("l"));
        assert_eq!(record.footer_center(), None);
        assert_eq!(record.display_name().as_deref(), Some("Test user"));
    }

    #[test]
    fn navigation_snapshot_is_detached_from_source() {
        let record = LayoutRecord::new();
        let (count, _sub) = counting(&record);
        let mut source = vec![NavigationEntry::new("a", "A"), NavigationEntry::new("b", "B")];

        assert!(record.set_navigation(source.iter().cloned()).is_ok());
        source.reverse();
        source.push(NavigationEntry::new("c", "C"));
        source[0].text = "mutated".into();

        let nav = record.navigation();
        let stored: Vec<&str> = nav.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(stored, vec!["a", "b"]);
        assert_eq!(record.navigation()[1].text, "B");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn identical_navigation_still_notifies() {
        let record = LayoutRecord::new();
        let (count, _sub) = counting(&record);
        let items = vec![NavigationEntry::new("a", "A")];

        assert!(record.set_navigation(items.clone()).is_ok());
        assert!(record.set_navigation(items).is_ok());

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn rejected_navigation_leaves_state_untouched() {
        let record = LayoutRecord::new();
        assert!(record.set_navigation(vec![NavigationEntry::new("keep", "Keep")]).is_ok());
        let (count, _sub) = counting(&record);

        let result = record.set_navigation(vec![
            NavigationEntry::new("a", "A").with_parent("b"),
            NavigationEntry::new("b", "B").with_parent("a"),
        ]);

        assert!(result.is_err());
        assert_eq!(record.navigation()[0].id, "keep");
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_collections_are_valid() {
        let record = LayoutRecord::new();
        let (count, _sub) = counting(&record);

        assert!(record.set_navigation(Vec::new()).is_ok());
        record.set_profile_menu(Vec::new());

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn profile_menu_snapshot_is_detached_from_source() {
        let record = LayoutRecord::new();
        let mut source = vec![
            ProfileMenuEntry::new("1", "Profile").with_order(1),
            ProfileMenuEntry::new("2", "Settings").with_order(2),
        ];

        record.set_profile_menu(source.clone());
        source.clear();

        assert_eq!(record.profile_menu().len(), 2);
        assert_eq!(record.profile_menu()[0].text, "Profile");
    }

    #[test]
    fn sidebar_deduplicates() {
        let record = LayoutRecord::new();
        let (count, _sub) = counting(&record);

        record.set_sidebar_open(true);
        assert_eq!(count.load(Ordering::SeqCst), 0);

        record.set_sidebar_open(false);
        record.set_sidebar_open(false);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        record.toggle_sidebar();
        assert!(record.is_sidebar_open());
        record.toggle_sidebar();
        assert!(!record.is_sidebar_open());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn theme_same_value_fires_nothing() {
        let record = LayoutRecord::new();
        let (count, _sub) = counting(&record);
        let themes = Arc::new(AtomicUsize::new(0));
        let theme_counter = Arc::clone(&themes);
        let _theme = record.subscribe_theme(move |_| {
            theme_counter.fetch_add(1, Ordering::SeqCst);
        });

        record.set_theme_mode(record.theme_mode());

        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(themes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn theme_change_orders_theme_before_changed() {
        let record = LayoutRecord::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let changed_log = Arc::clone(&log);
        let theme_log = Arc::clone(&log);
        let _changed =
            record.subscribe_changed(move || changed_log.lock().push("Changed".to_string()));
        let _theme = record.subscribe_theme(move |mode| {
            theme_log
                .lock()
                .push(format!("ThemeModeChanged({mode})"))
        });

        record.set_theme_mode(ThemeMode::Light);

        assert_eq!(record.theme_mode(), ThemeMode::Light);
        assert_eq!(*log.lock(), vec!["ThemeModeChanged(Light)", "Changed"]);
    }

    #[test]
    fn listeners_observe_updated_state() {
        let record = LayoutRecord::new();
        let seen = Arc::new(Mutex::new(None));
        let seen_store = Arc::clone(&seen);
        let reader = record.clone();
        let _sub = record.subscribe_changed(move || {
            *seen_store.lock() = Some(reader.title());
        });

        record.set_header("Fresh", None);

        assert_eq!(seen.lock().as_deref(), Some("Fresh"));
    }

    #[tokio::test]
    async fn toggle_theme_cycles_from_default() {
        let record = LayoutRecord::new();
        let (count, _sub) = counting(&record);

        record.toggle_theme().await;
        assert_eq!(record.theme_mode(), ThemeMode::System);
        record.toggle_theme().await;
        assert_eq!(record.theme_mode(), ThemeMode::Light);
        record.toggle_theme().await;
        assert_eq!(record.theme_mode(), ThemeMode::Dark);

        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}

//! Preference persistence
//!
//! Store traits for the two persisted preferences, a restore step meant to
//! run inside a setup hook, and [`PreferenceSync`], which writes changes back
//! as they happen. Persistence failures are logged and dropped here; they
//! never reach the record or its callers.

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

use crate::errors::StoreError;
use crate::init::TaskSpawner;
use crate::notify::Subscription;
use crate::state::{LayoutRecord, DEFAULT_SIDEBAR_OPEN, DEFAULT_THEME_MODE};
use crate::types::ThemeMode;

/// Persisted theme mode.
#[async_trait]
pub trait ThemeModeStore: Send + Sync {
    /// Stored mode, `None` when nothing usable is stored.
    async fn load(&self) -> Result<Option<ThemeMode>, StoreError>;

    /// Persist `mode`.
    async fn save(&self, mode: ThemeMode) -> Result<(), StoreError>;
}

/// Persisted sidebar open flag.
#[async_trait]
pub trait SidebarStateStore: Send + Sync {
    /// Stored flag, `None` when nothing is stored.
    async fn load(&self) -> Result<Option<bool>, StoreError>;

    /// Persist `open`.
    async fn save(&self, open: bool) -> Result<(), StoreError>;
}

/// The pair of stores used by restore and sync.
#[derive(Clone)]
pub struct PreferenceStores {
    /// Theme store
    pub theme: Arc<dyn ThemeModeStore>,
    /// Sidebar store
    pub sidebar: Arc<dyn SidebarStateStore>,
}

impl PreferenceStores {
    /// Combine two stores.
    pub fn new(theme: Arc<dyn ThemeModeStore>, sidebar: Arc<dyn SidebarStateStore>) -> Self {
        Self { theme, sidebar }
    }

    /// Use one store for both preferences.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: ThemeModeStore + SidebarStateStore + 'static,
    {
        Self {
            theme: store.clone(),
            sidebar: store,
        }
    }
}

impl fmt::Debug for PreferenceStores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStores").finish_non_exhaustive()
    }
}

/// Values applied by [`restore_preferences`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoredPreferences {
    /// Theme mode now on the record
    pub theme_mode: ThemeMode,
    /// Sidebar flag now on the record
    pub sidebar_open: bool,
}

/// Apply stored preferences to `record`.
///
/// A preference that is missing or cannot be loaded falls back to its default,
/// which is applied and written back once.
pub async fn restore_preferences(
    record: &LayoutRecord,
    stores: &PreferenceStores,
) -> RestoredPreferences {
    let theme_mode = match stores.theme.load().await {
        Ok(Some(mode)) => mode,
        Ok(None) => {
            write_default_theme(stores).await;
            DEFAULT_THEME_MODE
        }
        Err(err) => {
            tracing::debug!(error = %err, "theme preference unavailable, using default");
            write_default_theme(stores).await;
            DEFAULT_THEME_MODE
        }
    };
    record.set_theme_mode(theme_mode);

    let sidebar_open = match stores.sidebar.load().await {
        Ok(Some(open)) => open,
        Ok(None) => {
            write_default_sidebar(stores).await;
            DEFAULT_SIDEBAR_OPEN
        }
        Err(err) => {
            tracing::debug!(error = %err, "sidebar preference unavailable, using default");
            write_default_sidebar(stores).await;
            DEFAULT_SIDEBAR_OPEN
        }
    };
    record.set_sidebar_open(sidebar_open);

    RestoredPreferences {
        theme_mode,
        sidebar_open,
    }
}

async fn write_default_theme(stores: &PreferenceStores) {
    if let Err(err) = stores.theme.save(DEFAULT_THEME_MODE).await {
        tracing::debug!(error = %err, "failed to persist default theme");
    }
}

async fn write_default_sidebar(stores: &PreferenceStores) {
    if let Err(err) = stores.sidebar.save(DEFAULT_SIDEBAR_OPEN).await {
        tracing::debug!(error = %err, "failed to persist default sidebar state");
    }
}

/// Writes preference changes back to the stores.
///
/// Each save runs as its own spawned task. The sidebar flag is only written
/// when it differs from the value last handed to the store. Dropping the sync
/// stops further writes.
pub struct PreferenceSync {
    _theme: Subscription,
    _changed: Subscription,
}

impl PreferenceSync {
    /// Start syncing `record` into `stores`.
    pub fn attach(
        record: &LayoutRecord,
        stores: PreferenceStores,
        spawner: Arc<dyn TaskSpawner>,
    ) -> Self {
        let theme = {
            let store = Arc::clone(&stores.theme);
            let spawner = Arc::clone(&spawner);
            record.subscribe_theme(move |mode| {
                let store = Arc::clone(&store);
                let save = async move {
                    if let Err(err) = store.save(mode).await {
                        tracing::debug!(error = %err, %mode, "failed to persist theme");
                    }
                };
                if let Err(err) = spawner.spawn(save.boxed()) {
                    tracing::debug!(error = %err, "could not schedule theme save");
                }
            })
        };

        let changed = {
            let store = Arc::clone(&stores.sidebar);
            let last_saved = Arc::new(Mutex::new(record.is_sidebar_open()));
            let reader = record.clone();
            record.subscribe_changed(move || {
                let open = reader.is_sidebar_open();
                {
                    let mut last = last_saved.lock();
                    if *last == open {
                        return;
                    }
                    *last = open;
                }
                let store = Arc::clone(&store);
                let save = async move {
                    if let Err(err) = store.save(open).await {
                        tracing::debug!(error = %err, open, "failed to persist sidebar state");
                    }
                };
                if let Err(err) = spawner.spawn(save.boxed()) {
                    tracing::debug!(error = %err, "could not schedule sidebar save");
                }
            })
        };

        Self {
            _theme: theme,
            _changed: changed,
        }
    }
}

impl fmt::Debug for PreferenceSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceSync").finish_non_exhaustive()
    }
}

//! In-memory preference stores

use async_trait::async_trait;
use parking_lot::Mutex;
use shell_core::{SidebarStateStore, StoreError, ThemeMode, ThemeModeStore};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct MemoryState {
    theme: Option<ThemeMode>,
    sidebar: Option<bool>,
    theme_saves: Vec<ThemeMode>,
    sidebar_saves: Vec<bool>,
}

/// Preference store backed by memory, recording every save.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    state: Mutex<MemoryState>,
}

impl MemoryPreferenceStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a theme.
    pub fn with_theme(self, mode: ThemeMode) -> Self {
        self.state.lock().theme = Some(mode);
        self
    }

    /// Store pre-seeded with a sidebar flag.
    pub fn with_sidebar(self, open: bool) -> Self {
        self.state.lock().sidebar = Some(open);
        self
    }

    /// Currently stored theme.
    pub fn theme(&self) -> Option<ThemeMode> {
        self.state.lock().theme
    }

    /// Currently stored sidebar flag.
    pub fn sidebar(&self) -> Option<bool> {
        self.state.lock().sidebar
    }

    /// Every saved theme, oldest first.
    pub fn theme_saves(&self) -> Vec<ThemeMode> {
        self.state.lock().theme_saves.clone()
    }

    /// Every saved sidebar flag, oldest first.
    pub fn sidebar_saves(&self) -> Vec<bool> {
        self.state.lock().sidebar_saves.clone()
    }
}

#[async_trait]
impl ThemeModeStore for MemoryPreferenceStore {
    async fn load(&self) -> Result<Option<ThemeMode>, StoreError> {
        Ok(self.state.lock().theme)
    }

    async fn save(&self, mode: ThemeMode) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.theme = Some(mode);
        state.theme_saves.push(mode);
        Ok(())
    }
}

#[async_trait]
impl SidebarStateStore for MemoryPreferenceStore {
    async fn load(&self) -> Result<Option<bool>, StoreError> {
        Ok(self.state.lock().sidebar)
    }

    async fn save(&self, open: bool) -> Result<(), StoreError> {
        let mut state = self.state.lock();
        state.sidebar = Some(open);
        state.sidebar_saves.push(open);
        Ok(())
    }
}

/// Preference store whose every operation fails.
#[derive(Debug, Default)]
pub struct FailingPreferenceStore {
    loads: AtomicUsize,
    saves: AtomicUsize,
}

impl FailingPreferenceStore {
    /// New failing store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of attempted loads.
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    /// Number of attempted saves.
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn fail<T>(&self, counter: &AtomicUsize) -> Result<T, StoreError> {
        counter.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::unavailable("store offline"))
    }
}

#[async_trait]
impl ThemeModeStore for FailingPreferenceStore {
    async fn load(&self) -> Result<Option<ThemeMode>, StoreError> {
        self.fail(&self.loads)
    }

    async fn save(&self, _mode: ThemeMode) -> Result<(), StoreError> {
        self.fail(&self.saves)
    }
}

#[async_trait]
impl SidebarStateStore for FailingPreferenceStore {
    async fn load(&self) -> Result<Option<bool>, StoreError> {
        self.fail(&self.loads)
    }

    async fn save(&self, _open: bool) -> Result<(), StoreError> {
        self.fail(&self.saves)
    }
}

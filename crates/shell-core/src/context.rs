//! Layout context
//!
//! The object a host keeps for one page shell: the shared [`LayoutRecord`],
//! the [`InitEngine`] running the host's setup, and the profile-menu click
//! hook.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::errors::LayoutResult;
use crate::init::{CancellationToken, InitEngine, InitPhase, TaskSpawner, TokioSpawner};
use crate::state::LayoutRecord;
use crate::types::ProfileMenuEntry;

/// Reacts to profile menu selections.
#[async_trait]
pub trait ProfileMenuHandler: Send + Sync {
    /// Called when `entry` is selected.
    async fn on_item_clicked(&self, entry: &ProfileMenuEntry);
}

/// Handler that ignores every selection.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProfileMenuHandler;

#[async_trait]
impl ProfileMenuHandler for NoopProfileMenuHandler {
    async fn on_item_clicked(&self, _entry: &ProfileMenuEntry) {}
}

/// Layout record plus lazy initialization.
///
/// Clones share the record, the engine and the click handler.
#[derive(Clone)]
pub struct LayoutContext {
    record: LayoutRecord,
    engine: InitEngine,
    profile_handler: Arc<RwLock<Arc<dyn ProfileMenuHandler>>>,
}

impl LayoutContext {
    /// Context whose setup does nothing.
    pub fn without_setup() -> Self {
        Self::new(|_record| async { Ok(()) })
    }

    /// Context running `setup` on the ambient tokio runtime.
    ///
    /// `setup` receives a handle to the context's record for every attempt.
    pub fn new<F, Fut>(setup: F) -> Self
    where
        F: Fn(LayoutRecord) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LayoutResult<()>> + Send + 'static,
    {
        Self::with_spawner(setup, Arc::new(TokioSpawner))
    }

    /// Context running `setup` through `spawner`.
    pub fn with_spawner<F, Fut>(setup: F, spawner: Arc<dyn TaskSpawner>) -> Self
    where
        F: Fn(LayoutRecord) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LayoutResult<()>> + Send + 'static,
    {
        let record = LayoutRecord::new();
        let setup_record = record.clone();
        let engine = InitEngine::with_spawner(move || setup(setup_record.clone()), spawner);
        Self {
            record,
            engine,
            profile_handler: Arc::new(RwLock::new(Arc::new(NoopProfileMenuHandler))),
        }
    }

    /// Shared layout record.
    pub fn record(&self) -> &LayoutRecord {
        &self.record
    }

    /// Initialization engine.
    pub fn engine(&self) -> &InitEngine {
        &self.engine
    }

    /// Current initialization phase.
    pub fn phase(&self) -> InitPhase {
        self.engine.phase()
    }

    /// Run or join setup. See [`InitEngine::initialize`].
    pub async fn initialize(&self, cancel: &dyn CancellationToken) -> LayoutResult<()> {
        self.engine.initialize(cancel).await
    }

    /// Replace the profile-menu click handler.
    pub fn set_profile_menu_handler(&self, handler: Arc<dyn ProfileMenuHandler>) {
        *self.profile_handler.write() = handler;
    }

    /// Forward a profile menu selection to the current handler.
    pub async fn on_profile_menu_item_clicked(&self, entry: &ProfileMenuEntry) {
        let handler = Arc::clone(&*self.profile_handler.read());
        tracing::trace!(item = %entry.id, "profile menu item selected");
        handler.on_item_clicked(entry).await;
    }
}

impl fmt::Debug for LayoutContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutContext")
            .field("record", &self.record)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

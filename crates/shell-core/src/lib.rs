//! # Shell Core - Headless page-shell layout state
//!
//! **Purpose**: Own the state shared by every page of an application shell
//! and tell the rendering layer when it changes.
//!
//! This crate holds no rendering code. A host (desktop shell, TUI, web view)
//! keeps a [`LayoutContext`], feeds it navigation entries and locations, and
//! redraws when a notification fires.
//!
//! ## Core Concepts
//!
//! - **Layout record**: header, navigation, sidebar, footer, theme and profile
//!   fields behind one cloneable handle ([`LayoutRecord`])
//! - **Notifications**: explicit observer lists; a theme change notifies theme
//!   listeners before the generic changed listeners ([`NotificationBus`])
//! - **Initialization**: a host-supplied setup routine run lazily, once at a
//!   time, retried after failure, with per-caller cancellation
//!   ([`InitEngine`])
//! - **Navigation**: href normalization, a per-snapshot index and
//!   nearest-ancestor resolution of the active entry ([`nav`])
//! - **Preferences**: theme and sidebar persistence through store traits
//!   ([`prefs`])
//!
//! ## What's NOT in this crate
//!
//! - Concrete preference stores (see `shell-store`)
//! - Rendering, styling or input handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Declarative layout configuration
pub mod config;

/// Layout context: record, initialization and profile-menu hook
pub mod context;

/// Error types
pub mod errors;

/// Single-flight initialization and cancellation
pub mod init;

/// Navigation indexing and active-path resolution
pub mod nav;

/// Notification bus
pub mod notify;

/// Preference persistence
pub mod prefs;

/// Observable layout state record
pub mod state;

/// Layout data types
pub mod types;

pub use config::LayoutConfig;
pub use context::{LayoutContext, NoopProfileMenuHandler, ProfileMenuHandler};
pub use errors::{ErrorCategory, LayoutError, LayoutResult, StoreError};
pub use init::{
    CancelSignal, CancellationToken, InitEngine, InitPhase, NeverCancel, TaskSpawner, TokioSpawner,
};
pub use nav::{NavNode, NavigationHost, NavigationIndex};
pub use notify::{Notification, NotificationBus, Subscription, SubscriptionId};
pub use prefs::{
    restore_preferences, PreferenceStores, PreferenceSync, RestoredPreferences, SidebarStateStore,
    ThemeModeStore,
};
pub use state::{LayoutRecord, LayoutState};
pub use types::{NavigationEntry, ParseThemeModeError, ProfileMenuEntry, ThemeMode};

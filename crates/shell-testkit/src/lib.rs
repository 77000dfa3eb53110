//! Shell Testing Infrastructure
//!
//! Controllable setup routines, in-memory preference stores, a manual task
//! spawner and a notification recorder for exercising `shell-core`.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! shell-testkit = { path = "../shell-testkit" }
//! ```
//!
//! ```rust,no_run
//! use shell_core::NeverCancel;
//! use shell_testkit::BlockingSetup;
//!
//! # async fn demo() {
//! let setup = BlockingSetup::new();
//! let engine = setup.engine();
//! let pending = tokio::spawn({
//!     let engine = engine.clone();
//!     async move { engine.initialize(&NeverCancel).await }
//! });
//! setup.wait_entered().await;
//! setup.release();
//! assert!(pending.await.unwrap().is_ok());
//! # }
//! ```

pub mod recorder;
pub mod setups;
pub mod spawner;
pub mod stores;

pub use recorder::EventRecorder;
pub use setups::{BlockingSetup, Outcome, ScriptedSetup};
pub use spawner::ManualSpawner;
pub use stores::{FailingPreferenceStore, MemoryPreferenceStore};

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test-friendly `fmt` subscriber once per process.
///
/// Filtering follows `RUST_LOG`; nothing is printed when it is unset.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

//! Controllable setup routines
//!
//! [`BlockingSetup`] parks every attempt until released, which lets a test
//! observe callers while an attempt is in flight. [`ScriptedSetup`] returns a
//! scripted sequence of outcomes.

use futures::future::{BoxFuture, FutureExt};
use parking_lot::Mutex;
use shell_core::{InitEngine, LayoutContext, LayoutError, LayoutResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

// ============================================================================
// BlockingSetup
// ============================================================================

struct BlockingInner {
    calls: AtomicUsize,
    entered: watch::Sender<usize>,
    released: watch::Sender<bool>,
}

/// Setup that signals entry and then waits for [`release`](Self::release).
#[derive(Clone)]
pub struct BlockingSetup {
    inner: Arc<BlockingInner>,
}

impl Default for BlockingSetup {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockingSetup {
    /// Create an unreleased setup.
    pub fn new() -> Self {
        let (entered, _) = watch::channel(0);
        let (released, _) = watch::channel(false);
        Self {
            inner: Arc::new(BlockingInner {
                calls: AtomicUsize::new(0),
                entered,
                released,
            }),
        }
    }

    /// Number of times the setup routine has been invoked.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// One setup invocation.
    pub fn run(&self) -> BoxFuture<'static, LayoutResult<()>> {
        let inner = Arc::clone(&self.inner);
        async move {
            inner.calls.fetch_add(1, Ordering::SeqCst);
            inner.entered.send_modify(|count| *count += 1);

            let mut released = inner.released.subscribe();
            loop {
                let done = *released.borrow_and_update();
                if done || released.changed().await.is_err() {
                    break;
                }
            }
            Ok(())
        }
        .boxed()
    }

    /// Wait until at least one invocation has started.
    pub async fn wait_entered(&self) {
        let mut entered = self.inner.entered.subscribe();
        loop {
            let count = *entered.borrow_and_update();
            if count > 0 || entered.changed().await.is_err() {
                break;
            }
        }
    }

    /// Let every current and future invocation complete.
    pub fn release(&self) {
        self.inner.released.send_replace(true);
    }

    /// Engine driven by this setup.
    pub fn engine(&self) -> InitEngine {
        let setup = self.clone();
        InitEngine::new(move || setup.run())
    }

    /// Context driven by this setup.
    pub fn context(&self) -> LayoutContext {
        let setup = self.clone();
        LayoutContext::new(move |_record| setup.run())
    }
}

// ============================================================================
// ScriptedSetup
// ============================================================================

/// Result of one scripted invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Return `Ok(())`
    Succeed,
    /// Return [`LayoutError::Initialization`] with the message
    Fail(String),
    /// Return [`LayoutError::Cancelled`]
    Cancel,
}

impl Outcome {
    fn into_result(self) -> LayoutResult<()> {
        match self {
            Outcome::Succeed => Ok(()),
            Outcome::Fail(message) => Err(LayoutError::initialization(message)),
            Outcome::Cancel => Err(LayoutError::cancelled("setup cancelled")),
        }
    }
}

struct ScriptedInner {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Outcome>>,
    fallback: Outcome,
}

/// Setup returning scripted outcomes, then a fixed fallback.
#[derive(Clone)]
pub struct ScriptedSetup {
    inner: Arc<ScriptedInner>,
}

impl ScriptedSetup {
    /// Play `script` in order, then succeed forever.
    pub fn new(script: impl IntoIterator<Item = Outcome>) -> Self {
        Self::with_fallback(script, Outcome::Succeed)
    }

    /// Play `script` in order, then return `fallback` forever.
    pub fn with_fallback(script: impl IntoIterator<Item = Outcome>, fallback: Outcome) -> Self {
        Self {
            inner: Arc::new(ScriptedInner {
                calls: AtomicUsize::new(0),
                script: Mutex::new(script.into_iter().collect()),
                fallback,
            }),
        }
    }

    /// Always succeed.
    pub fn succeeding() -> Self {
        Self::new([])
    }

    /// Fail with `message` on every invocation.
    pub fn always_failing(message: impl Into<String>) -> Self {
        Self::with_fallback([], Outcome::Fail(message.into()))
    }

    /// Fail the first invocation, then succeed.
    pub fn fail_once(message: impl Into<String>) -> Self {
        Self::new([Outcome::Fail(message.into())])
    }

    /// Report cancellation on the first invocation, then succeed.
    pub fn cancel_once() -> Self {
        Self::new([Outcome::Cancel])
    }

    /// Number of times the setup routine has been invoked.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    /// One setup invocation.
    pub fn run(&self) -> BoxFuture<'static, LayoutResult<()>> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let outcome = self
            .inner
            .script
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.inner.fallback.clone());
        async move {
            tokio::task::yield_now().await;
            outcome.into_result()
        }
        .boxed()
    }

    /// Engine driven by this setup.
    pub fn engine(&self) -> InitEngine {
        let setup = self.clone();
        InitEngine::new(move || setup.run())
    }

    /// Context driven by this setup.
    pub fn context(&self) -> LayoutContext {
        let setup = self.clone();
        LayoutContext::new(move |_record| setup.run())
    }
}

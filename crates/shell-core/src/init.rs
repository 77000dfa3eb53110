//! Single-flight initialization
//!
//! [`InitEngine`] runs a caller-supplied setup routine at most once at a time
//! and at most once successfully:
//!
//! ```text
//! Uninitialized --initialize()--> Pending --Ok--> Ready (terminal)
//!                                   |
//!                                   +--Err--> Uninitialized (next call retries)
//! ```
//!
//! Every attempt runs on a spawned task, so a caller that stops waiting (its
//! token fires, or its future is dropped) never aborts the attempt other
//! callers are waiting on. The slot mutex only guards the start/reuse/retire
//! decision and is never held across an `.await`.

use async_trait::async_trait;
use futures::channel::oneshot;
use futures::future::{self, BoxFuture, Either, FutureExt, Shared};
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

use crate::errors::{LayoutError, LayoutResult};

/// Future returned by a setup routine.
pub type SetupFuture = BoxFuture<'static, LayoutResult<()>>;

/// Setup routine invoked once per attempt.
pub type SetupFn = Arc<dyn Fn() -> SetupFuture + Send + Sync>;

type SharedAttempt = Shared<BoxFuture<'static, LayoutResult<()>>>;

// ============================================================================
// Cancellation
// ============================================================================

/// Cooperative cancellation token.
#[async_trait]
pub trait CancellationToken: Send + Sync {
    /// Resolves when cancellation is requested.
    async fn cancelled(&self);

    /// Non-blocking cancellation check.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Cancellation token that never triggers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverCancel;

#[async_trait]
impl CancellationToken for NeverCancel {
    async fn cancelled(&self) {
        future::pending::<()>().await;
    }
}

/// Cloneable cancellation token triggered by [`CancelSignal::cancel`].
#[derive(Debug, Clone)]
pub struct CancelSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CancelSignal {
    /// Create an untriggered signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Create a signal that is already triggered.
    pub fn cancelled_now() -> Self {
        let signal = Self::new();
        signal.cancel();
        signal
    }

    /// Trigger the signal. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CancellationToken for CancelSignal {
    async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        loop {
            let triggered = *rx.borrow_and_update();
            if triggered || rx.changed().await.is_err() {
                return;
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

// ============================================================================
// Task spawning
// ============================================================================

/// Task spawning contract used to run initialization attempts.
pub trait TaskSpawner: Send + Sync {
    /// Spawn a background task.
    fn spawn(&self, fut: BoxFuture<'static, ()>) -> LayoutResult<()>;
}

/// Spawner backed by the ambient tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

impl TaskSpawner for TokioSpawner {
    fn spawn(&self, fut: BoxFuture<'static, ()>) -> LayoutResult<()> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| LayoutError::initialization(format!("no tokio runtime: {e}")))?;
        drop(handle.spawn(fut));
        Ok(())
    }
}

// ============================================================================
// InitEngine
// ============================================================================

/// Observable initialization phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPhase {
    /// No attempt has succeeded and none is running
    Uninitialized,
    /// An attempt is running
    Pending {
        /// 1-based number of the running attempt
        attempt: u64,
    },
    /// An attempt succeeded
    Ready,
}

enum Slot {
    Uninitialized,
    Pending { attempt: u64, shared: SharedAttempt },
    Ready,
}

#[derive(Default)]
struct EngineInner {
    slot: Mutex<SlotCell>,
    generation: AtomicU64,
    attempts: AtomicU64,
}

struct SlotCell(Slot);

impl Default for SlotCell {
    fn default() -> Self {
        Self(Slot::Uninitialized)
    }
}

impl EngineInner {
    /// Leave `Pending` for `attempt`, unless a newer attempt owns the slot.
    fn retire(&self, attempt: u64, succeeded: bool) {
        let mut slot = self.slot.lock();
        if matches!(slot.0, Slot::Pending { attempt: current, .. } if current == attempt) {
            slot.0 = if succeeded {
                Slot::Ready
            } else {
                Slot::Uninitialized
            };
        }
    }
}

/// Retires its attempt as failed if the task ends without reporting.
struct AttemptGuard {
    inner: Arc<EngineInner>,
    attempt: u64,
    finished: bool,
}

impl AttemptGuard {
    fn finish(&mut self, succeeded: bool) {
        self.finished = true;
        self.inner.retire(self.attempt, succeeded);
    }
}

impl Drop for AttemptGuard {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(attempt = self.attempt, "initialization task ended early");
            self.inner.retire(self.attempt, false);
        }
    }
}

/// Lazy, single-flight, retryable initializer.
#[derive(Clone)]
pub struct InitEngine {
    setup: SetupFn,
    spawner: Arc<dyn TaskSpawner>,
    inner: Arc<EngineInner>,
}

impl InitEngine {
    /// Create an engine running `setup` on the ambient tokio runtime.
    pub fn new<F, Fut>(setup: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LayoutResult<()>> + Send + 'static,
    {
        Self::with_spawner(setup, Arc::new(TokioSpawner))
    }

    /// Create an engine running `setup` through `spawner`.
    pub fn with_spawner<F, Fut>(setup: F, spawner: Arc<dyn TaskSpawner>) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = LayoutResult<()>> + Send + 'static,
    {
        let setup: SetupFn = Arc::new(move || setup().boxed());
        Self {
            setup,
            spawner,
            inner: Arc::new(EngineInner::default()),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> InitPhase {
        match &self.inner.slot.lock().0 {
            Slot::Uninitialized => InitPhase::Uninitialized,
            Slot::Pending { attempt, .. } => InitPhase::Pending { attempt: *attempt },
            Slot::Ready => InitPhase::Ready,
        }
    }

    /// Whether setup has completed successfully.
    pub fn is_ready(&self) -> bool {
        self.phase() == InitPhase::Ready
    }

    /// Number of attempts that invoked setup.
    ///
    /// An attempt whose task could not be spawned is not counted.
    pub fn attempts(&self) -> u64 {
        self.inner.attempts.load(Ordering::Acquire)
    }

    /// Wait for initialization, starting an attempt if none is running.
    ///
    /// `cancel` ends only this caller's wait with [`LayoutError::Cancelled`];
    /// the running attempt is unaffected. Once ready, returns `Ok(())`
    /// immediately even if `cancel` has fired.
    pub async fn initialize(&self, cancel: &dyn CancellationToken) -> LayoutResult<()> {
        let Some(attempt) = self.acquire(cancel)? else {
            return Ok(());
        };

        match future::select(attempt, cancel.cancelled()).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(LayoutError::cancelled("initialization wait cancelled")),
        }
    }

    /// Decide between "already ready", "join the running attempt" and
    /// "start a new attempt".
    fn acquire(&self, cancel: &dyn CancellationToken) -> LayoutResult<Option<SharedAttempt>> {
        let (attempt, shared, done_tx) = {
            let mut slot = self.inner.slot.lock();
            match &slot.0 {
                Slot::Ready => return Ok(None),
                Slot::Pending { shared, .. } if !cancel.is_cancelled() => {
                    return Ok(Some(shared.clone()));
                }
                _ if cancel.is_cancelled() => {
                    return Err(LayoutError::cancelled("initialization wait cancelled"));
                }
                _ => {}
            }

            let attempt = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
            let (done_tx, done_rx) = oneshot::channel::<LayoutResult<()>>();
            let shared = done_rx
                .map(|received| {
                    received.unwrap_or_else(|_| {
                        Err(LayoutError::initialization(
                            "initialization task ended without a result",
                        ))
                    })
                })
                .boxed()
                .shared();
            slot.0 = Slot::Pending {
                attempt,
                shared: shared.clone(),
            };
            (attempt, shared, done_tx)
        };

        // Spawn outside the slot lock: an inline spawner would otherwise
        // deadlock when the attempt retires itself.
        let setup = Arc::clone(&self.setup);
        let counter = Arc::clone(&self.inner);
        let mut guard = AttemptGuard {
            inner: Arc::clone(&self.inner),
            attempt,
            finished: false,
        };
        let task = async move {
            tracing::debug!(attempt, "initialization attempt started");
            counter.attempts.fetch_add(1, Ordering::AcqRel);
            let result = setup().await;
            guard.finish(result.is_ok());
            match &result {
                Ok(()) => tracing::debug!(attempt, "initialization attempt succeeded"),
                Err(err) => tracing::debug!(attempt, error = %err, "initialization attempt failed"),
            }
            let _ = done_tx.send(result);
        }
        .boxed();

        if let Err(err) = self.spawner.spawn(task) {
            self.inner.retire(attempt, false);
            return Err(err);
        }
        Ok(Some(shared))
    }
}

impl fmt::Debug for InitEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InitEngine")
            .field("phase", &self.phase())
            .field("attempts", &self.attempts())
            .finish()
    }
}

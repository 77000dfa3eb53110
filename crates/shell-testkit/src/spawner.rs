//! Manually driven task spawner

use futures::future::{join_all, BoxFuture};
use parking_lot::Mutex;
use shell_core::{LayoutResult, TaskSpawner};

/// Spawner that queues tasks until the test runs them.
#[derive(Default)]
pub struct ManualSpawner {
    queue: Mutex<Vec<BoxFuture<'static, ()>>>,
}

impl ManualSpawner {
    /// Empty spawner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of queued tasks.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Run every queued task to completion, including tasks queued meanwhile.
    pub async fn run_pending(&self) {
        loop {
            let batch = std::mem::take(&mut *self.queue.lock());
            if batch.is_empty() {
                return;
            }
            join_all(batch).await;
        }
    }
}

impl TaskSpawner for ManualSpawner {
    fn spawn(&self, fut: BoxFuture<'static, ()>) -> LayoutResult<()> {
        self.queue.lock().push(fut);
        Ok(())
    }
}

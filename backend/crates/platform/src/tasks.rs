//! Background task tracking
//!
//! Fire-and-forget writes (counter updates on the allow path) run detached
//! from the response, but they are registered here so that shutdown, and
//! tests, can wait for them. Dropping the client connection does not cancel
//! them.

use std::future::Future;
use tokio_util::task::TaskTracker;

/// Tracker for detached work spawned while handling requests
#[derive(Clone, Default)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self {
            tracker: TaskTracker::new(),
        }
    }

    /// Spawn a tracked task; failures are logged, never surfaced
    pub fn spawn<F, E>(&self, name: &'static str, fut: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        self.tracker.spawn(async move {
            if let Err(e) = fut.await {
                tracing::warn!(task = name, error = %e, "Background task failed");
            }
        });
    }

    /// Number of tasks still running
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Wait for every task spawned so far, then accept new ones again
    pub async fn flush(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }

    /// Wait for outstanding tasks during shutdown
    pub async fn drain(&self) {
        let pending = self.tracker.len();
        if pending > 0 {
            tracing::info!(pending, "Waiting for background writes to finish");
        }
        self.tracker.close();
        self.tracker.wait().await;
    }
}

//! Fire-and-forget work that must not block a request or a dispatch.

use std::fmt::Display;
use std::future::Future;

use tokio_util::task::TaskTracker;

/// Tracks detached tasks so shutdown can wait for them.
///
/// Failures are logged and never propagated; a panicking task only takes
/// itself down.
#[derive(Debug, Clone, Default)]
pub struct BackgroundTasks {
    tracker: TaskTracker,
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn<F, E>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.tracker.spawn(async move {
            if let Err(e) = task.await {
                tracing::error!(task = label, error = %e, "Background task failed");
            }
        });
    }

    /// Number of tasks still running.
    pub fn len(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracker.is_empty()
    }

    /// Waits for every spawned task to finish. New tasks may be spawned
    /// afterwards.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

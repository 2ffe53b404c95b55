//! Concurrency limiter
//!
//! Bounds how many tasks run at once. Excess tasks wait in submission order
//! and are admitted as running ones finish. The limiter knows nothing about
//! assets and can be shared by unrelated task sets.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

use crate::error::{Error, Result};

/// FIFO concurrency limiter
#[derive(Debug)]
pub struct Limiter {
    permits: Semaphore,
    max: usize,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl Limiter {
    /// Create a limiter admitting at most `max` tasks at once (at least 1)
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            // tokio's semaphore hands out permits in FIFO order
            permits: Semaphore::new(max),
            max,
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    /// Run `task` once a slot is free.
    ///
    /// The task's own output, failed or not, is returned untouched. The only
    /// error here is [`Error::LimiterClosed`], when the limiter was closed
    /// before the task was admitted.
    pub async fn run<F>(&self, task: F) -> Result<F::Output>
    where
        F: Future,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| Error::LimiterClosed)?;

        let _active = ActiveGuard::enter(&self.active, &self.peak);
        tracing::trace!(
            active = self.active.load(Ordering::SeqCst),
            max = self.max,
            "task admitted"
        );
        Ok(task.await)
    }

    /// Stop admitting tasks. Waiting tasks fail with [`Error::LimiterClosed`];
    /// running tasks are not interrupted.
    pub fn close(&self) {
        self.permits.close();
    }

    /// Whether [`close`](Self::close) was called
    pub fn is_closed(&self) -> bool {
        self.permits.is_closed()
    }

    /// Configured maximum
    pub fn max_concurrency(&self) -> usize {
        self.max
    }

    /// Tasks currently running
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest number of tasks that ever ran at once
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

struct ActiveGuard<'a> {
    active: &'a AtomicUsize,
}

impl<'a> ActiveGuard<'a> {
    fn enter(active: &'a AtomicUsize, peak: &AtomicUsize) -> Self {
        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        Self { active }
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

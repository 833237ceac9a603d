//! # UiDispatcher: a single-threaded, in-order execution context.
//!
//! [`UiDispatcher`] stands in for the host's interactive event loop: one
//! dedicated worker task drains an unbounded queue and runs each job to
//! completion before the next, so all UI-affine callbacks are serialized in
//! submission order.
//!
//! ## What it guarantees
//! - `begin_invoke` returns immediately (fire-and-forget).
//! - Jobs run FIFO relative to each other.
//! - A panicking job is caught and reported to stderr; the worker survives.
//!
//! ## What it does **not** guarantee
//! - No ordering relative to jobs submitted by other publishers racing
//!   concurrently (submission order is whatever the queue observes).
//! - No delivery after [`shutdown`](UiDispatcher::shutdown): pending jobs are
//!   discarded.
//!
//! ## Diagram
//! ```text
//!    begin_invoke(job)
//!        │
//!        └──► [unbounded queue] ──► worker task ──► job()
//!                                      └─► panic caught → stderr
//! ```

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{Dispatcher, Job};

/// Serialized fire-and-forget execution context backed by one tokio task.
///
/// Requires a tokio runtime at construction time (the worker is spawned
/// eagerly). Typically wrapped in an `Arc` and handed to
/// [`EventAggregator::with_ui_dispatcher`](crate::EventAggregator::with_ui_dispatcher).
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<Job>,
    cancel: CancellationToken,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl UiDispatcher {
    /// Creates the dispatcher and spawns its worker task.
    #[must_use]
    pub fn new() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let cancel = CancellationToken::new();
        let stop = cancel.clone();

        let worker = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    job = rx.recv() => match job {
                        Some(job) => {
                            if let Err(panic) = catch_unwind(AssertUnwindSafe(job)) {
                                eprintln!("[typedbus] ui subscriber panicked: {panic:?}");
                            }
                        }
                        None => break,
                    },
                }
            }
        });

        Self {
            tx,
            cancel,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Graceful shutdown: stop the worker and await its completion.
    ///
    /// Jobs still queued are discarded. Subsequent `begin_invoke` calls are
    /// silently dropped, consistent with the fire-and-forget contract.
    /// Idempotent.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = worker {
            let _ = handle.await;
        }
    }
}

impl Default for UiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher for UiDispatcher {
    fn begin_invoke(&self, job: Job) {
        // Send only fails after shutdown, when jobs are discarded by contract.
        let _ = self.tx.send(job);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_jobs_run_in_submission_order() {
        let dispatcher = UiDispatcher::new();
        let (tx, rx) = mpsc::channel();

        for i in 0..16 {
            let tx = tx.clone();
            dispatcher.begin_invoke(Box::new(move || {
                tx.send(i).unwrap();
            }));
        }

        let received: Vec<i32> = (0..16)
            .map(|_| rx.recv_timeout(Duration::from_secs(5)).unwrap())
            .collect();
        assert_eq!(received, (0..16).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_worker_survives_a_panicking_job() {
        let dispatcher = UiDispatcher::new();
        dispatcher.begin_invoke(Box::new(|| panic!("boom")));

        let (tx, rx) = mpsc::channel();
        dispatcher.begin_invoke(Box::new(move || {
            tx.send(()).unwrap();
        }));
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_shutdown_is_idempotent_and_discards_later_jobs() {
        let dispatcher = UiDispatcher::new();
        dispatcher.shutdown().await;
        dispatcher.shutdown().await;

        // Dropped silently, no panic.
        dispatcher.begin_invoke(Box::new(|| {}));
    }
}

//! Channel plumbing for the worker pool.
//!
//! This module defines the [`WorkerPool`] struct, which owns the sending half
//! of every worker's order channel along with the shared
//! [`CancellationToken`]. Each worker listens on its own bounded
//! [`mpsc::Receiver`] and executes tasks independently; which worker receives
//! a given task is decided by the registry, not here.

use taskforge_core::{
    Error, Result,
    types::{WorkOrder, WorkerId},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// The coordinator's handle on its workers: one bounded order channel per
/// worker, addressed by [`WorkerId`].
pub struct WorkerPool {
    workers: Vec<mpsc::Sender<WorkOrder>>,
    shutdown_token: CancellationToken,
}

impl WorkerPool {
    /// Constructs a [`WorkerPool`] from initialized worker channels and a
    /// shared cancellation token.
    pub const fn new(
        workers: Vec<mpsc::Sender<WorkOrder>>,
        shutdown_token: CancellationToken,
    ) -> Self {
        Self {
            workers,
            shutdown_token,
        }
    }

    /// Number of workers in the pool.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Sends a [`WorkOrder`] to the given worker.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The service is shutting down (`shutdown_token` was cancelled).
    /// - The worker id is out of range (a dispatcher bug).
    /// - The worker's channel is closed.
    pub async fn send_to(&self, worker: WorkerId, order: WorkOrder) -> Result<()> {
        if self.shutdown_token.is_cancelled() {
            return Err(Error::ServiceShutdown);
        }

        let Some(tx) = self.workers.get(worker) else {
            return Err(Error::ProtocolViolation {
                context: format!("dispatch to unknown worker {worker}"),
            });
        };

        tx.send(order).await.map_err(|_| Error::ChannelError {
            context: format!("Worker {worker} channel closed"),
        })
    }

    /// Sends a stop order to every worker, one per id.
    ///
    /// Runs during the TERMINATING phase, after the pool has drained, so it
    /// deliberately ignores the cancellation token: stop orders must go out
    /// even (especially) when shutdown has been requested. A closed channel
    /// is logged and skipped; if the acknowledgment then never arrives, the
    /// collector surfaces that as a channel fault.
    pub async fn stop_all(&self) {
        for (worker, tx) in self.workers.iter().enumerate() {
            if tx.send(WorkOrder::Stop).await.is_err() {
                tracing::error!("Failed to send stop order to worker {worker}");
            }
        }
    }
}

//! Worker task responsible for executing [`WorkOrder`] messages.
//!
//! Each worker owns its own executor and has no visibility into the registry.
//! The worker listens on its bounded order channel and processes tasks until
//! a stop order is received, sending every outcome back over the shared
//! results channel.
//!
//! This function is designed to be spawned as a Tokio task and runs until
//! explicitly stopped.

use taskforge_core::{
    compute::TaskExecutor,
    types::{TaskResult, WorkOrder, WorkerId, WorkerReply},
};
use tokio::sync::mpsc;

/// Per-worker execution loop.
///
/// # Order Types
///
/// - [`WorkOrder::Task`] — run the executor and send back a
///   [`WorkerReply::Completed`] whose result is routed to the originating
///   client.
/// - [`WorkOrder::Stop`] — acknowledge with [`WorkerReply::Stopped`] and
///   exit; the worker performs no further receives.
pub async fn worker_loop<E: TaskExecutor>(
    worker_id: WorkerId,
    mut orders: mpsc::Receiver<WorkOrder>,
    replies: mpsc::Sender<WorkerReply>,
    executor: E,
) {
    tracing::trace!("Worker {worker_id} started");

    while let Some(order) = orders.recv().await {
        match order {
            WorkOrder::Task(task) => {
                let body = executor.execute(&task.kind, &task.param);
                let reply = WorkerReply::Completed {
                    worker: worker_id,
                    result: TaskResult {
                        client: task.client,
                        body,
                    },
                };
                if replies.send(reply).await.is_err() {
                    tracing::debug!("Worker {worker_id} exiting: results channel closed");
                    return;
                }
            }
            WorkOrder::Stop => {
                tracing::debug!("Worker {worker_id} received stop order");
                if replies
                    .send(WorkerReply::Stopped { worker: worker_id })
                    .await
                    .is_err()
                {
                    tracing::error!("Worker {worker_id} failed to acknowledge stop");
                }
                break;
            }
        }
    }

    tracing::trace!("Worker {worker_id} stopped");
}

//! The result collector: receives outcomes from any worker and persists them.
//!
//! This is coordinator role B. It runs concurrently with the dispatch loop
//! for the lifetime of the run, blocked on the shared results channel (the
//! many-to-one analogue of receiving from any worker). It exits once every
//! worker has acknowledged its stop order.

use crate::dispatcher::{
    journal::{ClientOutputs, Journal},
    registry::WorkerRegistry,
};
use std::sync::Arc;
use taskforge_core::{Error, Result, types::WorkerReply};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Receives worker replies until all `num_workers` stop acknowledgments have
/// been counted.
///
/// For each completed task, the result block is durably appended to the
/// client's output file BEFORE the worker is released back to the registry:
/// a subsequent dispatch to the same worker must not be able to race ahead
/// of the previous result's persistence.
///
/// Any failure cancels the shared token so the dispatch loop stops instead
/// of polling forever against a dead collector.
pub async fn collect_results(
    replies: mpsc::Receiver<WorkerReply>,
    registry: Arc<WorkerRegistry>,
    journal: Arc<Journal>,
    outputs: ClientOutputs,
    num_workers: usize,
    shutdown: CancellationToken,
) -> Result<()> {
    let result = collect_inner(replies, registry, journal, outputs, num_workers).await;
    if result.is_err() {
        shutdown.cancel();
    }
    result
}

async fn collect_inner(
    mut replies: mpsc::Receiver<WorkerReply>,
    registry: Arc<WorkerRegistry>,
    journal: Arc<Journal>,
    outputs: ClientOutputs,
    num_workers: usize,
) -> Result<()> {
    let mut stopped = 0;
    while stopped < num_workers {
        let Some(reply) = replies.recv().await else {
            return Err(Error::ChannelError {
                context: format!(
                    "results channel closed with {stopped} of {num_workers} workers stopped"
                ),
            });
        };
        match reply {
            WorkerReply::Completed { worker, result } => {
                tracing::trace!("Collected result from worker {worker} for {}", result.client);
                outputs.append(&result).await?;
                journal.task_completed(worker).await?;
                registry.release(worker)?;
            }
            WorkerReply::Stopped { worker } => {
                tracing::debug!("Worker {worker} acknowledged stop");
                stopped += 1;
            }
        }
    }

    tracing::debug!("All {num_workers} workers stopped");
    Ok(())
}

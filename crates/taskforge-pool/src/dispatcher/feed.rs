//! The dispatch loop: drains the task stream and distributes tasks across
//! idle workers.
//!
//! This is coordinator role A. It runs through four phases: DISPATCHING
//! (normal operation), DRAINING (stream exhausted, waiting for in-flight
//! tasks), TERMINATING (stop orders out to every worker), and DONE. The
//! result collector (role B) keeps running past DONE until every worker has
//! acknowledged its stop order.

use crate::dispatcher::{
    config::DispatcherConfig, journal::Journal, pool::manager::WorkerPool,
    registry::WorkerRegistry,
};
use std::sync::Arc;
use taskforge_core::{
    Error, Result,
    types::{CommandLine, WorkOrder},
};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Reads the command stream and dispatches every task to an idle worker,
/// then drives the shutdown phases.
///
/// # Behavior
///
/// - Blank, `WAIT`-prefixed, and unparsable lines produce no task; the
///   latter are logged and skipped (data, not faults).
/// - When no worker is idle, sleeps for the configured retry interval and
///   polls again. The poll loop doubles as the cancellation observation
///   point: an external shutdown request abandons the remaining input and
///   jumps straight to the stop orders.
/// - A task is only ever sent to a worker freshly acquired from the
///   registry, so no worker has two tasks in flight.
///
/// # Errors
///
/// Fails on I/O errors from the command stream or journal, and on a closed
/// worker channel. The caller cancels the shared token on failure so the
/// collector does not wait forever. A cancellation observed anywhere in the
/// dispatch path is not an error: the remaining input is abandoned and the
/// stop orders still go out.
pub async fn feed_tasks(
    config: &DispatcherConfig,
    registry: Arc<WorkerRegistry>,
    pool: Arc<WorkerPool>,
    journal: Arc<Journal>,
    shutdown: CancellationToken,
) -> Result<()> {
    let commands = File::open(&config.commands_path).await?;
    let mut lines = BufReader::new(commands).lines();

    // === Phase 1: DISPATCHING ===
    'stream: while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        if line.is_empty() {
            continue;
        }
        let task = match line.parse::<CommandLine>() {
            Ok(CommandLine::Wait) => continue,
            Ok(CommandLine::Task(task)) => task,
            Err(e) => {
                tracing::warn!("Skipping malformed command line: {e}");
                continue;
            }
        };
        journal.command_received(line).await?;

        let worker = loop {
            if shutdown.is_cancelled() {
                tracing::warn!("Shutdown requested; abandoning remaining input");
                break 'stream;
            }
            match registry.try_acquire_idle() {
                Some(worker) => break worker,
                None => sleep(config.retry_interval).await,
            }
        };

        match pool.send_to(worker, WorkOrder::Task(task)).await {
            Ok(()) => journal.task_dispatched(worker, line).await?,
            // A cancellation landing between the acquire poll and the send
            // surfaces here; it ends the stream, it does not fail the run.
            Err(Error::ServiceShutdown) => {
                tracing::warn!("Shutdown requested; abandoning remaining input");
                break 'stream;
            }
            Err(e) => return Err(e),
        }
    }

    // === Phase 2: DRAINING ===
    // Every dispatched task must be executed and collected before any stop
    // order goes out, so no ordinary result can race an acknowledgment.
    while !registry.all_idle() && !shutdown.is_cancelled() {
        sleep(config.retry_interval).await;
    }

    // === Phase 3: TERMINATING ===
    tracing::debug!("Task stream drained; stopping {} workers", pool.len());
    pool.stop_all().await;

    // === Phase 4: DONE ===
    Ok(())
}

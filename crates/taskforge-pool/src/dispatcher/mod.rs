//! Coordinator internals.
//!
//! The coordinator runs two concurrent roles over one shared registry: the
//! dispatch loop ([`feed`]) reads the task stream and hands tasks to idle
//! workers, while the result collector ([`collector`]) persists outcomes and
//! releases workers. Workers ([`pool::worker`]) are independent tasks with a
//! single sequential loop each; the registry ([`registry`]) is the only state
//! they all share, and only the coordinator touches it.
//!
//! ## Structure
//!
//! - [`config`] - CLI/env arguments and the validated runtime configuration.
//! - [`registry`] - the worker availability table.
//! - [`pool`] - per-worker channels and the worker execution loop.
//! - [`feed`] - the dispatch loop and shutdown phases.
//! - [`collector`] - result persistence and stop accounting.
//! - [`journal`] - the run journal and per-client output files.
//! - [`telemetry`] - console diagnostics setup.

pub mod collector;
pub mod config;
pub mod feed;
pub mod journal;
pub mod pool;
pub mod registry;
pub mod telemetry;

use crate::dispatcher::{
    collector::collect_results,
    config::DispatcherConfig,
    feed::feed_tasks,
    journal::{ClientOutputs, Journal},
    pool::{manager::WorkerPool, worker::worker_loop},
    registry::WorkerRegistry,
};
use std::sync::Arc;
use taskforge_core::{Error, Result, compute::BuiltinExecutor, types::WorkerReply};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// A fully wired coordinator: registry, worker pool, journal, and the shared
/// results channel, ready to drive one run of the task stream.
pub struct Dispatcher {
    config: DispatcherConfig,
    registry: Arc<WorkerRegistry>,
    pool: Arc<WorkerPool>,
    journal: Arc<Journal>,
    outputs: ClientOutputs,
    results_rx: mpsc::Receiver<WorkerReply>,
    shutdown: CancellationToken,
}

impl Dispatcher {
    /// Opens the journal and spawns the worker pool.
    ///
    /// Each worker owns a fresh executor and its own bounded order channel.
    /// The channel capacity is 1: the registry guarantees at most one task in
    /// flight per worker, so a deeper queue would only hide a dispatch bug.
    /// All workers share one results channel, which is how the collector can
    /// receive from any worker without polling each.
    ///
    /// # Errors
    ///
    /// Fails if the journal file or the output directory cannot be created
    /// (startup faults; the process should exit with a diagnostic before any
    /// task is dispatched).
    pub async fn new(config: DispatcherConfig, shutdown: CancellationToken) -> Result<Self> {
        let journal = Arc::new(Journal::create(&config.log_path).await?);
        // An unusable output directory must fail the run here, not at the
        // first collected result, which would lose a dispatched task.
        tokio::fs::create_dir_all(&config.output_dir).await?;
        let outputs = ClientOutputs::new(&config.output_dir);
        let registry = Arc::new(WorkerRegistry::new(config.num_workers));

        let (results_tx, results_rx) = mpsc::channel(config.num_workers);
        let mut workers = Vec::with_capacity(config.num_workers);
        for worker_id in 0..config.num_workers {
            let (tx, rx) = mpsc::channel(1);
            workers.push(tx);
            tokio::spawn(worker_loop(
                worker_id,
                rx,
                results_tx.clone(),
                BuiltinExecutor,
            ));
        }
        // The collector must observe a closed channel if every worker dies,
        // so the coordinator keeps no sender of its own.
        drop(results_tx);

        let pool = Arc::new(WorkerPool::new(workers, shutdown.clone()));

        Ok(Self {
            config,
            registry,
            pool,
            journal,
            outputs,
            results_rx,
            shutdown,
        })
    }

    /// Drives one full run: dispatch loop and collector concurrently, then
    /// both joined. Returns once every worker has acknowledged its stop
    /// order (or on the first fatal error).
    pub async fn run(self) -> Result<()> {
        let Self {
            config,
            registry,
            pool,
            journal,
            outputs,
            results_rx,
            shutdown,
        } = self;

        let collector = tokio::spawn(collect_results(
            results_rx,
            Arc::clone(&registry),
            Arc::clone(&journal),
            outputs,
            pool.len(),
            shutdown.clone(),
        ));

        let fed = feed_tasks(&config, registry, Arc::clone(&pool), journal, shutdown.clone()).await;
        if fed.is_err() {
            // Dispatch died before its stop orders went out. Stop the
            // workers anyway so the collector can finish its accounting.
            shutdown.cancel();
            pool.stop_all().await;
        }

        let collected = collector.await.map_err(|e| Error::ChannelError {
            context: format!("collector task failed: {e}"),
        })?;

        fed.and(collected)
    }
}

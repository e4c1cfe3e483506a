//! Run artifacts: the timestamped event journal and per-client output files.
//!
//! Both are domain outputs, distinct from `tracing` diagnostics: the journal
//! is the run's append-only record of received/dispatched/completed events,
//! and each client gets an append-only `<client>.txt` collecting its result
//! blocks. Every append is flushed before returning, so callers can order
//! side effects against these writes.

use chrono::Local;
use std::path::{Path, PathBuf};
use taskforge_core::{
    Result,
    types::{TaskResult, WorkerId},
};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// ctime(3)-style local timestamps, e.g. `Fri Aug 29 10:30:00 2025`.
const TIMESTAMP_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Append-only journal of dispatcher events, shared by the dispatch loop and
/// the result collector.
pub struct Journal {
    file: Mutex<File>,
}

impl Journal {
    /// Opens (truncating) the journal file. Failure here is a startup fault:
    /// the caller aborts the run.
    pub async fn create(path: &Path) -> Result<Self> {
        let file = File::create(path).await?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    pub async fn command_received(&self, line: &str) -> Result<()> {
        self.append(&format!("Command received: {line}")).await
    }

    pub async fn task_dispatched(&self, worker: WorkerId, line: &str) -> Result<()> {
        self.append(&format!("Task dispatched to worker {worker}: {line}"))
            .await
    }

    pub async fn task_completed(&self, worker: WorkerId) -> Result<()> {
        self.append(&format!("Task completed by worker {worker}")).await
    }

    async fn append(&self, event: &str) -> Result<()> {
        let stamp = Local::now().format(TIMESTAMP_FORMAT);
        let mut file = self.file.lock().await;
        file.write_all(format!("[{stamp}] {event}\n").as_bytes())
            .await?;
        file.flush().await?;
        Ok(())
    }
}

/// Per-client result files under the output directory.
#[derive(Debug, Clone)]
pub struct ClientOutputs {
    dir: PathBuf,
}

impl ClientOutputs {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Appends one result block to `<client>.txt` (create-or-append) and
    /// flushes it. The collector releases the worker only after this returns,
    /// so a re-dispatch to the same worker cannot overtake the write.
    pub async fn append(&self, result: &TaskResult) -> Result<()> {
        let path = self.dir.join(format!("{}.txt", result.client));
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;
        file.write_all(result.block().as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

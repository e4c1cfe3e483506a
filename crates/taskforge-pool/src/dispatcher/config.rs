//! Startup configuration for the coordinator binary.

use anyhow::ensure;
use core::time::Duration;
use std::path::PathBuf;

/// Command-line arguments, each with an environment-variable fallback.
#[derive(Debug, clap::Parser)]
#[command(name = "taskforge-pool", version, about)]
pub struct CliArgs {
    /// Path to the task stream file (one command per line).
    #[arg(long, env = "TASKFORGE_COMMANDS", default_value = "commands.txt")]
    pub commands: PathBuf,

    /// Path to the run journal; truncated at startup.
    #[arg(long, env = "TASKFORGE_LOG", default_value = "log.txt")]
    pub log: PathBuf,

    /// Directory receiving the per-client `<client>.txt` result files.
    #[arg(long, env = "TASKFORGE_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Number of workers in the pool; defaults to the number of CPUs.
    #[arg(long, env = "TASKFORGE_WORKERS")]
    pub workers: Option<usize>,

    /// Backoff between idle-worker polls, in milliseconds.
    #[arg(long, env = "TASKFORGE_RETRY_INTERVAL_MS", default_value_t = 10)]
    pub retry_interval_ms: u64,
}

/// Validated runtime configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub commands_path: PathBuf,
    pub log_path: PathBuf,
    pub output_dir: PathBuf,
    pub num_workers: usize,
    /// Sleep between registry polls while waiting for an idle worker and
    /// while draining in-flight tasks at shutdown.
    pub retry_interval: Duration,
}

impl TryFrom<CliArgs> for DispatcherConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let num_workers = args.workers.unwrap_or_else(num_cpus::get);
        ensure!(num_workers >= 1, "worker pool must have at least one worker");
        ensure!(
            args.retry_interval_ms >= 1,
            "retry interval must be at least 1ms"
        );

        Ok(Self {
            commands_path: args.commands,
            log_path: args.log,
            output_dir: args.output_dir,
            num_workers,
            retry_interval: Duration::from_millis(args.retry_interval_ms),
        })
    }
}

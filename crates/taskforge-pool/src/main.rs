use anyhow::Context;
use clap::Parser;
use taskforge_pool::dispatcher::{
    Dispatcher,
    config::{CliArgs, DispatcherConfig},
    telemetry::init_telemetry,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = DispatcherConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let dispatcher = Dispatcher::new(config, shutdown)
        .await
        .context("failed to start the dispatcher")?;
    dispatcher.run().await.context("run failed")?;

    tracing::info!("Service shut down successfully");
    Ok(())
}

fn log_startup_info(config: &DispatcherConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting dispatcher with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting dispatcher on {} with {} workers",
            config.commands_path.display(),
            config.num_workers
        );
    }
}

/// Cancels the shared token on Ctrl+C or (on unix) SIGTERM. The dispatch
/// loop observes the token between polls and jumps to the stop orders.
async fn shutdown_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }

    tracing::info!("Shutdown signal received, terminating gracefully...");
    shutdown.cancel();
}

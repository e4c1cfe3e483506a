//! Full-run tests: command stream in, client files and journal out.

use core::time::Duration;
use std::path::Path;
use taskforge_core::compute::{BuiltinExecutor, TaskExecutor};
use taskforge_core::types::TaskKind;
use taskforge_pool::dispatcher::{Dispatcher, config::DispatcherConfig};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn config_in(dir: &Path, num_workers: usize) -> DispatcherConfig {
    DispatcherConfig {
        commands_path: dir.join("commands.txt"),
        log_path: dir.join("log.txt"),
        output_dir: dir.to_path_buf(),
        num_workers,
        retry_interval: Duration::from_millis(2),
    }
}

async fn run_to_completion(config: DispatcherConfig, shutdown: CancellationToken) {
    let dispatcher = Dispatcher::new(config, shutdown).await.unwrap();
    tokio::time::timeout(Duration::from_secs(10), dispatcher.run())
        .await
        .expect("run must terminate in bounded time")
        .unwrap();
}

fn read(path: impl AsRef<Path>) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn mixed_stream_routes_results_per_client() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("commands.txt"),
        "alice PRIMES 10\nbob PRIMEDIVISORS 12\nWAIT 5\nalice ANAGRAMS ab\n",
    )
    .unwrap();

    run_to_completion(config_in(dir.path(), 2), CancellationToken::new()).await;

    // alice gets both her blocks, in whichever order the workers finished.
    let alice = read(dir.path().join("alice.txt"));
    let primes_block = "alice\nFound 4 primes in the first 10 numbers.\n";
    let anagrams_block = "alice\nab\nba\n";
    assert!(alice.contains(primes_block), "missing primes block: {alice:?}");
    assert!(alice.contains(anagrams_block), "missing anagrams block: {alice:?}");
    assert_eq!(alice.len(), primes_block.len() + anagrams_block.len());

    let bob = read(dir.path().join("bob.txt"));
    assert_eq!(bob, "bob\nFound 2 prime divisors of 12.\n");

    // The WAIT line produces no task and no output anywhere.
    assert!(!dir.path().join("WAIT.txt").exists());
    let log = read(dir.path().join("log.txt"));
    assert!(!log.contains("WAIT"));
    assert_eq!(log.matches("Command received:").count(), 3);
    assert_eq!(log.matches("Task dispatched to worker").count(), 3);
    assert_eq!(log.matches("Task completed by worker").count(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn more_tasks_than_workers_loses_nothing() {
    let dir = TempDir::new().unwrap();
    let clients: Vec<String> = (0..8).map(|i| format!("client{i}")).collect();
    let commands: String = clients
        .iter()
        .enumerate()
        .map(|(i, client)| format!("{client} PRIMES {}\n", i + 5))
        .collect();
    std::fs::write(dir.path().join("commands.txt"), commands).unwrap();

    run_to_completion(config_in(dir.path(), 2), CancellationToken::new()).await;

    // Every task appears exactly once as a completed result.
    for (i, client) in clients.iter().enumerate() {
        let body = BuiltinExecutor.execute(&TaskKind::Primes, &(i + 5).to_string());
        let expected = format!("{client}\n{body}\n");
        assert_eq!(read(dir.path().join(format!("{client}.txt"))), expected);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_task_surfaces_in_client_output() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("commands.txt"), "carol FROBNICATE 9\n").unwrap();

    run_to_completion(config_in(dir.path(), 1), CancellationToken::new()).await;

    assert_eq!(
        read(dir.path().join("carol.txt")),
        "carol\nUnknown task: FROBNICATE\n"
    );
}

#[tokio::test]
async fn empty_stream_terminates_cleanly() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("commands.txt"), "").unwrap();

    run_to_completion(config_in(dir.path(), 3), CancellationToken::new()).await;

    // Journal exists but records no events.
    assert_eq!(read(dir.path().join("log.txt")), "");
}

#[tokio::test]
async fn malformed_lines_are_skipped() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("commands.txt"),
        "justoneword\n\nalice PRIMES 10\n",
    )
    .unwrap();

    run_to_completion(config_in(dir.path(), 1), CancellationToken::new()).await;

    let alice = read(dir.path().join("alice.txt"));
    assert_eq!(alice, "alice\nFound 4 primes in the first 10 numbers.\n");
    let log = read(dir.path().join("log.txt"));
    assert_eq!(log.matches("Command received:").count(), 1);
}

#[tokio::test]
async fn cancelled_run_stops_without_dispatching() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("commands.txt"), "alice PRIMES 10\n").unwrap();

    let shutdown = CancellationToken::new();
    shutdown.cancel();
    run_to_completion(config_in(dir.path(), 2), shutdown).await;

    // The input was abandoned before any dispatch.
    assert!(!dir.path().join("alice.txt").exists());
    let log = read(dir.path().join("log.txt"));
    assert!(!log.contains("Task dispatched"));
}

#[tokio::test]
async fn missing_output_directory_is_created_at_startup() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("commands.txt"), "alice PRIMES 10\n").unwrap();

    // The directory does not exist yet; startup must create it rather than
    // let the first collected result discover the problem after dispatch.
    let mut config = config_in(dir.path(), 1);
    config.output_dir = dir.path().join("out");

    run_to_completion(config, CancellationToken::new()).await;

    assert_eq!(
        read(dir.path().join("out").join("alice.txt")),
        "alice\nFound 4 primes in the first 10 numbers.\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn mid_run_cancellation_ends_cleanly() {
    let dir = TempDir::new().unwrap();
    let commands: String = (0..50)
        .map(|i| format!("client{i} ANAGRAMS abcdef\n"))
        .collect();
    std::fs::write(dir.path().join("commands.txt"), commands).unwrap();

    let shutdown = CancellationToken::new();
    let canceller = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            shutdown.cancel();
        })
    };

    // Wherever the cancellation lands in the dispatch path, the run must
    // stop every worker and finish without an error.
    run_to_completion(config_in(dir.path(), 2), shutdown).await;
    canceller.await.unwrap();
}

#[tokio::test]
async fn missing_command_stream_is_fatal() {
    let dir = TempDir::new().unwrap();
    let dispatcher = Dispatcher::new(config_in(dir.path(), 1), CancellationToken::new())
        .await
        .unwrap();
    let err = tokio::time::timeout(Duration::from_secs(10), dispatcher.run())
        .await
        .expect("run must terminate in bounded time")
        .unwrap_err();
    assert!(matches!(err, taskforge_core::Error::Io(_)));
}

//! # Coordinator/Worker Protocol Types
//!
//! This module defines the shared types exchanged between the coordinator and
//! its workers, plus the parser for task-stream command lines. Both sides of
//! the channel adhere to the same compile-time contract, so a worker can never
//! confuse a stop signal with task or result data.
//!
//! ## Message Types
//!
//! - [`WorkOrder`] - coordinator → worker: a task to execute, or a stop signal
//! - [`WorkerReply`] - worker → coordinator: a completed result, or a stop
//!   acknowledgment
//!
//! The original wire protocol overloaded a single `"STOP"` literal for both
//! directions; here each direction carries its own tagged variant.

use crate::error::Error;
use core::str::FromStr;

/// Identifies one worker in the pool, `0..num_workers`. Fixed for the life of
/// a run; worker slots are never created or destroyed mid-run.
pub type WorkerId = usize;

/// Stream lines beginning with this marker are no-ops: they produce no task,
/// no journal entry, and no output.
pub const WAIT_MARKER: &str = "WAIT";

/// The kind of computation a task requests.
///
/// Any keyword other than the three known ones parses to [`TaskKind::Unknown`]
/// rather than an error: malformed commands are data, not faults, and surface
/// to the client as an explicit "unknown task" result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskKind {
    Primes,
    PrimeDivisors,
    Anagrams,
    Unknown(String),
}

impl From<&str> for TaskKind {
    fn from(keyword: &str) -> Self {
        match keyword {
            "PRIMES" => Self::Primes,
            "PRIMEDIVISORS" => Self::PrimeDivisors,
            "ANAGRAMS" => Self::Anagrams,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

/// One task parsed from the task stream. Immutable once created; consumed
/// exactly once by exactly one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCommand {
    /// Originating client; results are appended to `<client>.txt`.
    pub client: String,
    pub kind: TaskKind,
    /// Single free-form parameter. Empty when the line omits it.
    pub param: String,
}

/// Classification of one raw task-stream line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandLine {
    /// A `WAIT`-prefixed no-op line.
    Wait,
    Task(TaskCommand),
}

impl FromStr for CommandLine {
    type Err = Error;

    /// Parses `WAIT <anything>` or `<client> <TASKTYPE> [<parameter>]`.
    ///
    /// Tokens past the parameter are ignored. Lines with fewer than two
    /// fields, or whose client name cannot form a file name, are rejected.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        if line.starts_with(WAIT_MARKER) {
            return Ok(Self::Wait);
        }

        let invalid = || Error::InvalidCommand {
            line: line.to_owned(),
        };

        let mut fields = line.split_whitespace();
        let client = fields.next().ok_or_else(invalid)?;
        let keyword = fields.next().ok_or_else(invalid)?;
        let param = fields.next().unwrap_or_default();

        // Client names become file names.
        if client.contains(['/', '\\']) || client == ".." {
            return Err(invalid());
        }

        Ok(Self::Task(TaskCommand {
            client: client.to_owned(),
            kind: TaskKind::from(keyword),
            param: param.to_owned(),
        }))
    }
}

/// Coordinator → worker message.
#[derive(Debug, Clone)]
pub enum WorkOrder {
    Task(TaskCommand),
    /// Stop requesting work. The worker acknowledges with
    /// [`WorkerReply::Stopped`] and performs no further receives.
    Stop,
}

/// One executed task's outcome, routed back to the originating client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskResult {
    pub client: String,
    /// Free-form result text produced by the executor.
    pub body: String,
}

impl TaskResult {
    /// The block appended to the client's output file: the client name on its
    /// own line, then the result text.
    pub fn block(&self) -> String {
        format!("{}\n{}\n", self.client, self.body)
    }
}

/// Worker → coordinator message.
#[derive(Debug, Clone)]
pub enum WorkerReply {
    Completed {
        worker: WorkerId,
        result: TaskResult,
    },
    /// Acknowledges a [`WorkOrder::Stop`]; the worker's loop has exited.
    Stopped { worker: WorkerId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_task_line() {
        let parsed: CommandLine = "alice PRIMES 10".parse().unwrap();
        assert_eq!(
            parsed,
            CommandLine::Task(TaskCommand {
                client: "alice".into(),
                kind: TaskKind::Primes,
                param: "10".into(),
            })
        );
    }

    #[test]
    fn unknown_keyword_is_data_not_an_error() {
        let parsed: CommandLine = "bob FROBNICATE 9".parse().unwrap();
        let CommandLine::Task(task) = parsed else {
            panic!("expected a task");
        };
        assert_eq!(task.kind, TaskKind::Unknown("FROBNICATE".into()));
    }

    #[test]
    fn wait_prefix_is_a_noop_line() {
        assert_eq!("WAIT 5".parse::<CommandLine>().unwrap(), CommandLine::Wait);
        assert_eq!("WAIT".parse::<CommandLine>().unwrap(), CommandLine::Wait);
    }

    #[test]
    fn missing_parameter_parses_as_empty() {
        let CommandLine::Task(task) = "carol ANAGRAMS".parse().unwrap() else {
            panic!("expected a task");
        };
        assert_eq!(task.param, "");
    }

    #[test]
    fn extra_fields_are_ignored() {
        let CommandLine::Task(task) = "dave PRIMES 10 junk junk".parse().unwrap() else {
            panic!("expected a task");
        };
        assert_eq!(task.param, "10");
    }

    #[test]
    fn short_lines_are_rejected() {
        assert!("alice".parse::<CommandLine>().is_err());
        assert!("".parse::<CommandLine>().is_err());
        assert!("   ".parse::<CommandLine>().is_err());
    }

    #[test]
    fn path_escaping_clients_are_rejected() {
        assert!("../etc PRIMES 10".parse::<CommandLine>().is_err());
        assert!("a/b PRIMES 10".parse::<CommandLine>().is_err());
    }

    #[test]
    fn result_block_starts_with_the_client_name() {
        let result = TaskResult {
            client: "alice".into(),
            body: "ab\nba".into(),
        };
        assert_eq!(result.block(), "alice\nab\nba\n");
    }
}

//! Error types for the task dispatch service.
//!
//! This module defines the central `Error` enum, which captures all
//! recoverable and reportable error cases within the dispatcher.
//!
//! ## Error Cases
//! - `ChannelError`: An internal communication failure between the
//!   coordinator and a worker (closed or dropped endpoint).
//! - `InvalidCommand`: A task-stream line that could not be parsed. Callers
//!   treat this as data, not a fault: the line is logged and skipped.
//! - `ProtocolViolation`: A dispatcher/collector desynchronization, such as
//!   releasing a worker that is already idle. Always fatal.
//! - `Io`: The journal, command stream, or a client output file failed.
//! - `ServiceShutdown`: A dispatch was attempted while shutting down.

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the task dispatch service.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Internal channel send/receive failure (e.g., closed endpoint).
    #[error("Channel error: {context}")]
    ChannelError { context: String },

    /// A task-stream line that does not follow `<client> <TASKTYPE> [<param>]`.
    #[error("Invalid command line: {line:?}")]
    InvalidCommand { line: String },

    /// The registry observed an operation that only a coordination bug can
    /// produce. Continuing would silently corrupt the busy/idle accounting.
    #[error("Protocol violation: {context}")]
    ProtocolViolation { context: String },

    /// An I/O failure on the command stream, journal, or client output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

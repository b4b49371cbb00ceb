// Error types for the AV Ops console
// Uses thiserror so every library call can propagate with `?`

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// The request never produced an HTTP response (DNS, refused connection,
    /// bad URL or header, timeout).
    #[error("{0}")]
    Transport(String),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("No history entry at position {0}")]
    HistoryIndex(usize),

    /// A call of the same flow is still in flight.
    #[error("{0} is already in flight")]
    Busy(&'static str),

    #[error("Task is empty")]
    EmptyTask,

    /// Copilot run answered with a non-success status.
    #[error("{0}")]
    CopilotFailed(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Could not encode output: {0}")]
    Encode(String),
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        ConsoleError::Transport(err.to_string())
    }
}

//! Structured error types for hookscope
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Probe bodies never produce these: everything that runs inside the host's
//! dispatch is infallible, errors only come from loading and writing files.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Failed to parse scenario: {0}")]
    ParseFailed(String),

    #[error("Scenario has no top-level dispatches")]
    EmptyRun,

    #[error("Event {event} dispatches unknown event {target}")]
    UnknownEvent { event: String, target: String },

    #[error("Top-level dispatch of unknown event {0}")]
    UnknownRunEvent(String),

    #[error("Nested dispatch deeper than {limit} levels starting at {event}")]
    NestingTooDeep { event: String, limit: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ScenarioError {
    fn from(err: serde_json::Error) -> Self {
        ScenarioError::ParseFailed(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {what}: {error}")]
    WriteFailed { what: String, error: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

//! Error handling module for ffgraph

use thiserror::Error;

/// Main error type for ffgraph operations
#[derive(Error, Debug)]
pub enum FfgraphError {
    /// Filter fed with the wrong number of input streams
    #[error("filter '{filter}' expects {expected} input stream(s), got {actual}")]
    ArityMismatch {
        filter: String,
        expected: usize,
        actual: usize,
    },

    /// Filter fed with a stream of the wrong type
    #[error("filter '{filter}' input {position} expects a {expected} stream, got {actual}")]
    TypeMismatch {
        filter: String,
        position: usize,
        expected: String,
        actual: String,
    },

    /// Filter output pad consumed more than once without a split
    #[error("output pad {pad} of filter '{filter}' feeds {count} consumers; insert a split or enable auto-fix")]
    MultipleConsumers {
        filter: String,
        pad: usize,
        count: usize,
    },

    /// Output file with no mapped input streams
    #[error("output '{filename}' has no mapped input streams")]
    EmptyOutput { filename: String },

    /// Cyclic graph detected during context building
    #[error("cycle detected in filter graph involving {node}")]
    CycleDetected { node: String },

    /// Option name not present in the catalogue
    #[error("unknown option: -{name}")]
    UnknownOption { name: String },

    /// Filter name not present in the catalogue
    #[error("unknown filter: {name}")]
    UnknownFilter { name: String },

    /// Stream label referenced before being defined
    #[error("unknown stream label: [{label}]")]
    UnknownLabel { label: String },

    /// Filter clause that does not match the mini-language grammar
    #[error("malformed filter clause '{clause}': {reason}")]
    InvalidClause { clause: String, reason: String },

    /// Command line that cannot be parsed
    #[error("invalid command line: {message}")]
    BadCommand { message: String },

    /// Option missing its value token
    #[error("option -{name} is missing its value")]
    MissingValue { name: String },

    /// Graph in a state the compiler cannot serialize
    #[error("invalid graph: {message}")]
    InvalidGraph { message: String },

    /// External process exited with a non-zero status
    #[error("{program} exited with status {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: i32,
        stdout: String,
        stderr: String,
    },

    /// External process exceeded its time limit
    #[error("{program} timed out after {seconds} second(s)")]
    Timeout { program: String, seconds: u64 },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ffgraph operations
pub type FfgraphResult<T> = std::result::Result<T, FfgraphError>;

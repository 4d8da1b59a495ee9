//! Error types for proc-warden.

use thiserror::Error;

use crate::execution::RunnerPhase;

/// Main error type for proc-warden operations.
#[derive(Error, Debug)]
pub enum ProcWardenError {
    /// No program was configured before execution.
    #[error("command is empty")]
    EmptyCommand,

    /// The child process could not be created.
    #[error("failed to launch `{program}`: {source}")]
    Launch {
        /// Program that failed to start.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid phase transition attempted.
    #[error("invalid phase transition from {from:?} to {to:?}")]
    InvalidPhaseTransition { from: RunnerPhase, to: RunnerPhase },

    /// Operation attempted in the wrong lifecycle phase.
    #[error("operation requires phase {required:?}, runner is {actual:?}")]
    WrongPhase {
        required: RunnerPhase,
        actual: RunnerPhase,
    },

    /// Raw stream handover requested while output collection is enabled,
    /// or the stream was already taken.
    #[error("raw stream unavailable: {0}")]
    RawStreamUnavailable(&'static str),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for proc-warden operations.
pub type Result<T> = std::result::Result<T, ProcWardenError>;

//! # proc-warden
//!
//! Bounded, timeout-aware native process execution.
//!
//! This crate launches a child process, drains its output and error
//! streams concurrently so neither can deadlock on a full OS pipe
//! buffer, optionally feeds it input, and enforces a wall-clock timeout
//! with forced termination. Results (exit code, timed-out flag, captured
//! bytes) become available once the process has fully terminated.
//!
//! ## Features
//!
//! - **Deadlock-free capture**: stdout and stderr drained in parallel
//! - **Byte caps**: per-stream capture limits, overflow silently dropped
//! - **Timeout enforcement**: poll-based liveness checks with kill-on-deadline
//! - **Single-use lifecycle**: configure, execute once, query — enforced
//!   by a phase machine instead of undefined early reads
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use proc_warden::{run, CommandSpec};
//!
//! fn main() -> proc_warden::Result<()> {
//!     // Initialize logging
//!     proc_warden::logging::try_init().ok();
//!
//!     let result = run(CommandSpec::new("echo")
//!         .arg("hello")
//!         .timeout(Duration::from_secs(5)))?;
//!
//!     println!("exit {}: {}", result.exit_code, result.stdout_trimmed());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod execution;
pub mod logging;
pub mod report;

// Re-export commonly used types
pub use error::{ProcWardenError, Result};
pub use execution::{
    run, run_with_input, CapturePolicy, CommandSpec, ExecutionResult, ProcessRunner, RunnerPhase,
    DEFAULT_STREAM_CAP, TIMEOUT_EXIT_CODE,
};

//! Bounded process execution.
//!
//! This module owns the full lifecycle of one external command:
//! - Launching the child with a merged environment and working directory
//! - Concurrent draining of stdout/stderr into capped buffers
//! - Best-effort stdin feeding
//! - Wall-clock timeout with forced termination
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use proc_warden::execution::{run, CommandSpec};
//!
//! let spec = CommandSpec::new("echo")
//!     .arg("hello")
//!     .timeout(Duration::from_secs(5));
//! let result = run(spec).unwrap();
//! assert_eq!(result.stdout_trimmed(), "hello");
//! ```

mod command;
mod executor;
mod phase;
mod pipes;
mod result;
mod sink;

pub use command::{CapturePolicy, CommandSpec};
pub use executor::{run, run_with_input, ProcessRunner, DRAIN_GRACE, POLL_INTERVAL};
pub use phase::RunnerPhase;
pub use result::{ExecutionResult, TIMEOUT_EXIT_CODE};
pub use sink::DEFAULT_STREAM_CAP;

//! Execution result types.

use std::time::Duration;

/// Exit code recorded when the child was killed on timeout.
///
/// The value is not exclusive to that cause: a child can exit with -1 on
/// its own, and signal-killed children report no code at all. The
/// [`timed_out`](ExecutionResult::timed_out) flag is the authoritative
/// signal.
pub const TIMEOUT_EXIT_CODE: i32 = -1;

/// Result of one finished process execution.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    /// Exit code of the child. [`TIMEOUT_EXIT_CODE`] when the run timed
    /// out or the child died to a signal.
    pub exit_code: i32,
    /// Whether the child was killed because the timeout elapsed.
    pub timed_out: bool,
    /// Bytes captured from the output stream (empty when collection was
    /// disabled).
    pub stdout: Vec<u8>,
    /// Bytes captured from the error stream (empty when collection was
    /// disabled).
    pub stderr: Vec<u8>,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl ExecutionResult {
    /// Check if the child exited cleanly (code 0, no timeout).
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == 0
    }

    /// Check if the run failed (non-zero exit code or timeout).
    pub fn failed(&self) -> bool {
        !self.success()
    }

    /// Captured output as text (lossy UTF-8).
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Captured error output as text (lossy UTF-8).
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }

    /// Captured output as text, trimmed of surrounding whitespace.
    pub fn stdout_trimmed(&self) -> String {
        self.stdout_text().trim().to_string()
    }

    /// Lines of the captured output.
    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout_text().lines().map(str::to_owned).collect()
    }
}

impl Default for ExecutionResult {
    fn default() -> Self {
        Self {
            exit_code: 0,
            timed_out: false,
            stdout: Vec::new(),
            stderr: Vec::new(),
            duration: Duration::ZERO,
        }
    }
}

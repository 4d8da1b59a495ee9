//! Command specification and capture policy.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use super::sink::DEFAULT_STREAM_CAP;

/// How much of the child's output and error streams to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturePolicy {
    /// Whether the streams are drained and collected at all. When false,
    /// the raw pipe handles are handed to the caller instead.
    pub collect: bool,
    /// Byte cap for the output stream; `None` collects without bound.
    pub max_stdout: Option<usize>,
    /// Byte cap for the error stream; `None` collects without bound.
    pub max_stderr: Option<usize>,
}

impl Default for CapturePolicy {
    fn default() -> Self {
        Self {
            collect: true,
            max_stdout: Some(DEFAULT_STREAM_CAP),
            max_stderr: Some(DEFAULT_STREAM_CAP),
        }
    }
}

/// Description of a native command to execute.
///
/// The program is invoked directly with its argument vector; no shell is
/// involved. Environment entries are merged over the inherited
/// environment, they never replace it wholesale.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Program to invoke.
    pub program: String,
    /// Arguments passed to the program, in order.
    pub args: Vec<String>,
    /// Environment overlay applied on top of the inherited environment.
    pub env: HashMap<String, String>,
    /// Working directory override (if any).
    pub working_dir: Option<PathBuf>,
    /// Wall-clock limit for the run; `None` waits forever.
    pub timeout: Option<Duration>,
    /// Output collection settings.
    pub capture: CapturePolicy,
}

impl CommandSpec {
    /// Create a spec for the given program with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: HashMap::new(),
            working_dir: None,
            timeout: None,
            capture: CapturePolicy::default(),
        }
    }

    /// Create a spec from a full argument vector; the first element is
    /// the program. An empty vector yields a spec that fails with an
    /// empty-command error at execution time.
    pub fn from_argv<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut items = argv.into_iter().map(Into::into);
        let program = items.next().unwrap_or_default();
        let mut spec = Self::new(program);
        spec.args = items.collect();
        spec
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an environment variable to the overlay.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Add multiple environment variables to the overlay.
    pub fn envs<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in vars {
            self.env.insert(k.into(), v.into());
        }
        self
    }

    /// Set the working directory.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Set the execution timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Set whether output is collected.
    pub fn collect_output(mut self, collect: bool) -> Self {
        self.capture.collect = collect;
        self
    }

    /// Cap the collected output stream at `max` bytes; `None` removes
    /// the bound.
    pub fn max_stdout_bytes(mut self, max: Option<usize>) -> Self {
        self.capture.max_stdout = max;
        self
    }

    /// Cap the collected error stream at `max` bytes; `None` removes
    /// the bound.
    pub fn max_stderr_bytes(mut self, max: Option<usize>) -> Self {
        self.capture.max_stderr = max;
        self
    }
}

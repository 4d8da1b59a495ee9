//! Process orchestration: launch, drain, poll, kill, collect.

use std::io::Read;
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::command::CommandSpec;
use super::phase::RunnerPhase;
use super::pipes::{spawn_feeder, DrainHandle};
use super::result::{ExecutionResult, TIMEOUT_EXIT_CODE};
use crate::error::ProcWardenError;
use crate::Result;

/// Interval between liveness checks of the child process. Termination is
/// detected with at most this much latency; the same applies to the
/// timeout deadline.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Bounded wait for the drainer tasks to finish once the child itself has
/// terminated. A drainer stuck on a misbehaving descriptor is abandoned
/// past this point and the run completes with the bytes captured so far.
pub const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Single-use executor for one native command.
///
/// A runner is configured (via [`CommandSpec`] and the input setters),
/// executed exactly once with [`execute`](Self::execute), then queried
/// through the result accessors. Accessors return a typed error until the
/// run has completed, and a completed runner refuses to run again; each
/// execution needs a freshly constructed runner.
///
/// The type is not meant to be shared: one thread owns the runner for its
/// whole lifecycle.
pub struct ProcessRunner {
    spec: CommandSpec,
    input: Option<Box<dyn Read + Send>>,
    phase: RunnerPhase,
    outcome: Option<ExecutionResult>,
    raw_stdout: Option<ChildStdout>,
    raw_stderr: Option<ChildStderr>,
}

impl ProcessRunner {
    /// Create a runner for the given command.
    pub fn new(spec: CommandSpec) -> Self {
        Self {
            spec,
            input: None,
            phase: RunnerPhase::Configuring,
            outcome: None,
            raw_stdout: None,
            raw_stderr: None,
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> RunnerPhase {
        self.phase
    }

    /// Supply bytes to feed to the child's stdin.
    ///
    /// Only legal before [`execute`](Self::execute).
    pub fn set_input_bytes(&mut self, bytes: impl Into<Vec<u8>>) -> Result<()> {
        self.require_configuring()?;
        self.input = Some(Box::new(std::io::Cursor::new(bytes.into())));
        Ok(())
    }

    /// Supply an arbitrary byte source to feed to the child's stdin.
    ///
    /// Only legal before [`execute`](Self::execute).
    pub fn set_input_reader<R>(&mut self, reader: R) -> Result<()>
    where
        R: Read + Send + 'static,
    {
        self.require_configuring()?;
        self.input = Some(Box::new(reader));
        Ok(())
    }

    /// Run the command to completion. Blocking.
    ///
    /// Launches the child, starts the stream drainers (when collecting)
    /// and the stdin feeder, then polls the child against the configured
    /// timeout. On timeout the child is killed and the result records
    /// [`TIMEOUT_EXIT_CODE`] with the timed-out flag set. After the child
    /// is gone, the drainers are given [`DRAIN_GRACE`] to finish before
    /// the captured bytes are frozen.
    pub fn execute(&mut self) -> Result<()> {
        if self.spec.program.is_empty() {
            return Err(ProcWardenError::EmptyCommand);
        }
        self.phase.transition_to(RunnerPhase::Running)?;

        let start = Instant::now();
        let mut child = self.launch()?;
        debug!(program = %self.spec.program, pid = child.id(), "child process started");

        // Drainers go up before any wait on the child. stdout/stderr are
        // piped, so the handles are present on a fresh child.
        let mut drains: Option<(DrainHandle, DrainHandle)> = None;
        if self.spec.capture.collect {
            if let (Some(out), Some(err)) = (child.stdout.take(), child.stderr.take()) {
                drains = Some((
                    DrainHandle::spawn(out, self.spec.capture.max_stdout, "stdout"),
                    DrainHandle::spawn(err, self.spec.capture.max_stderr, "stderr"),
                ));
            }
        } else {
            self.raw_stdout = child.stdout.take();
            self.raw_stderr = child.stderr.take();
        }

        if let Some(stdin) = child.stdin.take() {
            spawn_feeder(stdin, self.input.take());
        }

        let (exit_code, timed_out) = self.await_exit(&mut child, start)?;

        let (stdout, stderr) = match drains {
            Some((out_drain, err_drain)) => {
                let deadline = Instant::now() + DRAIN_GRACE;
                (out_drain.finish(deadline), err_drain.finish(deadline))
            }
            None => (Vec::new(), Vec::new()),
        };

        self.outcome = Some(ExecutionResult {
            exit_code,
            timed_out,
            stdout,
            stderr,
            duration: start.elapsed(),
        });
        self.phase.transition_to(RunnerPhase::Completed)?;
        Ok(())
    }

    /// Exit code of the child. Valid after [`execute`](Self::execute).
    pub fn exit_code(&self) -> Result<i32> {
        Ok(self.completed()?.exit_code)
    }

    /// Whether the child was killed on timeout. Valid after
    /// [`execute`](Self::execute).
    pub fn timed_out(&self) -> Result<bool> {
        Ok(self.completed()?.timed_out)
    }

    /// Captured output bytes. Valid after [`execute`](Self::execute);
    /// empty when collection was disabled.
    pub fn stdout(&self) -> Result<&[u8]> {
        Ok(&self.completed()?.stdout)
    }

    /// Captured error bytes. Valid after [`execute`](Self::execute);
    /// empty when collection was disabled.
    pub fn stderr(&self) -> Result<&[u8]> {
        Ok(&self.completed()?.stderr)
    }

    /// Captured output as text (lossy UTF-8).
    pub fn stdout_text(&self) -> Result<String> {
        Ok(self.completed()?.stdout_text())
    }

    /// Captured error output as text (lossy UTF-8).
    pub fn stderr_text(&self) -> Result<String> {
        Ok(self.completed()?.stderr_text())
    }

    /// Wall-clock duration of the run.
    pub fn duration(&self) -> Result<Duration> {
        Ok(self.completed()?.duration)
    }

    /// Borrow the full result. Valid after [`execute`](Self::execute).
    pub fn result(&self) -> Result<&ExecutionResult> {
        self.completed()
    }

    /// Consume the runner and take the result.
    pub fn into_result(self) -> Result<ExecutionResult> {
        let phase = self.phase;
        self.outcome.ok_or(ProcWardenError::WrongPhase {
            required: RunnerPhase::Completed,
            actual: phase,
        })
    }

    /// Take the child's raw output pipe.
    ///
    /// Only available after the run, and only when collection was
    /// disabled; the pipe is surrendered at most once. In this mode the
    /// caller owns all draining, including its deadlock risks.
    pub fn take_raw_stdout(&mut self) -> Result<ChildStdout> {
        self.completed()?;
        if self.spec.capture.collect {
            return Err(ProcWardenError::RawStreamUnavailable(
                "output collection is enabled",
            ));
        }
        self.raw_stdout
            .take()
            .ok_or(ProcWardenError::RawStreamUnavailable("stdout already taken"))
    }

    /// Take the child's raw error pipe. Same rules as
    /// [`take_raw_stdout`](Self::take_raw_stdout).
    pub fn take_raw_stderr(&mut self) -> Result<ChildStderr> {
        self.completed()?;
        if self.spec.capture.collect {
            return Err(ProcWardenError::RawStreamUnavailable(
                "output collection is enabled",
            ));
        }
        self.raw_stderr
            .take()
            .ok_or(ProcWardenError::RawStreamUnavailable("stderr already taken"))
    }

    fn require_configuring(&self) -> Result<()> {
        if self.phase.is_configuring() {
            Ok(())
        } else {
            Err(ProcWardenError::WrongPhase {
                required: RunnerPhase::Configuring,
                actual: self.phase,
            })
        }
    }

    fn completed(&self) -> Result<&ExecutionResult> {
        match (&self.outcome, self.phase) {
            (Some(result), RunnerPhase::Completed) => Ok(result),
            _ => Err(ProcWardenError::WrongPhase {
                required: RunnerPhase::Completed,
                actual: self.phase,
            }),
        }
    }

    fn launch(&self) -> Result<Child> {
        let mut cmd = Command::new(&self.spec.program);
        cmd.args(&self.spec.args)
            .envs(&self.spec.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &self.spec.working_dir {
            cmd.current_dir(dir);
        }
        cmd.spawn().map_err(|source| ProcWardenError::Launch {
            program: self.spec.program.clone(),
            source,
        })
    }

    /// Poll until the child exits or the timeout elapses.
    ///
    /// The exit check runs first on every tick, so a child seen finished
    /// on the deadline tick still reports its real exit code. Past the
    /// deadline the child is killed and reaped, and the run records
    /// [`TIMEOUT_EXIT_CODE`] with the timed-out flag.
    fn await_exit(&self, child: &mut Child, start: Instant) -> Result<(i32, bool)> {
        loop {
            if let Some(status) = child.try_wait()? {
                // Signal-killed children report no code.
                return Ok((status.code().unwrap_or(-1), false));
            }
            if let Some(limit) = self.spec.timeout {
                if start.elapsed() > limit {
                    warn!(
                        program = %self.spec.program,
                        timeout_ms = limit.as_millis() as u64,
                        "timeout exceeded; killing child process"
                    );
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok((TIMEOUT_EXIT_CODE, true));
                }
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Run a command to completion and return its result.
pub fn run(spec: CommandSpec) -> Result<ExecutionResult> {
    let mut runner = ProcessRunner::new(spec);
    runner.execute()?;
    runner.into_result()
}

/// Run a command with the given stdin bytes and return its result.
pub fn run_with_input(spec: CommandSpec, input: impl Into<Vec<u8>>) -> Result<ExecutionResult> {
    let mut runner = ProcessRunner::new(spec);
    runner.set_input_bytes(input)?;
    runner.execute()?;
    runner.into_result()
}

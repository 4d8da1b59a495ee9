//! End-to-end execution tests against real child processes.
//!
//! These exercise the full orchestration path: spawning, concurrent
//! stream draining, stdin feeding, timeout enforcement, and the
//! phase-guarded accessor contract.

#![cfg(unix)]

use std::io::Read;
use std::time::{Duration, Instant};

use proc_warden::{
    run, run_with_input, CommandSpec, ProcWardenError, ProcessRunner, TIMEOUT_EXIT_CODE,
};

const FIVE_MB: usize = 5 * 1024 * 1024;

/// Helper to run a shell one-liner.
fn sh(script: &str) -> CommandSpec {
    CommandSpec::new("sh").arg("-c").arg(script)
}

/// Shell pipeline printing `n` copies of `fill`.
fn filler(n: usize, fill: char) -> CommandSpec {
    sh(&format!("head -c {n} /dev/zero | tr '\\0' '{fill}'")).max_stdout_bytes(None)
}

// ============================================================================
// Exit status propagation
// ============================================================================

#[test]
fn test_clean_exit_reports_real_code() {
    let result = run(sh("exit 3")).unwrap();
    assert_eq!(result.exit_code, 3);
    assert!(!result.timed_out);
    assert!(result.failed());
}

#[test]
fn test_zero_exit_is_success_with_empty_streams() {
    let result = run(CommandSpec::new("true")).unwrap();
    assert!(result.success());
    assert!(result.stdout.is_empty());
    assert!(result.stderr.is_empty());
}

#[test]
fn test_launch_failure_is_typed_and_names_program() {
    let err = run(CommandSpec::new("proc-warden-missing-binary-31ce")).unwrap_err();
    match err {
        ProcWardenError::Launch { program, .. } => {
            assert_eq!(program, "proc-warden-missing-binary-31ce");
        }
        other => panic!("expected launch error, got {other:?}"),
    }
}

// ============================================================================
// Output capture
// ============================================================================

#[test]
fn test_stdout_is_captured() {
    let result = run(sh("echo hello")).unwrap();
    assert_eq!(result.stdout_text(), "hello\n");
    assert!(result.stderr.is_empty());
}

#[test]
fn test_stderr_is_captured_separately() {
    let result = run(sh("echo oops >&2")).unwrap();
    assert!(result.stdout.is_empty());
    assert_eq!(result.stderr_text(), "oops\n");
}

#[test]
fn test_unbounded_capture_round_trips_large_output() {
    let result = run(filler(FIVE_MB, 'a')).unwrap();
    assert!(result.success());
    assert_eq!(result.stdout.len(), FIVE_MB);
    assert!(result.stdout.iter().all(|&b| b == b'a'));
}

#[test]
fn test_capture_cap_bounds_collected_bytes() {
    let result = run(sh("head -c 100000 /dev/zero").max_stdout_bytes(Some(1000))).unwrap();
    assert!(result.success());
    assert_eq!(result.stdout.len(), 1000);
}

#[test]
fn test_zero_cap_collects_nothing_without_blocking() {
    let result = run(sh("head -c 100000 /dev/zero").max_stdout_bytes(Some(0))).unwrap();
    assert!(result.success());
    assert!(result.stdout.is_empty());
}

// ============================================================================
// Stdin feeding
// ============================================================================

#[test]
fn test_input_bytes_reach_the_child() {
    let result = run_with_input(CommandSpec::new("cat"), b"flam\n".to_vec()).unwrap();
    assert!(result.success());
    assert_eq!(result.stdout_text(), "flam\n");
}

#[test]
fn test_input_reader_reaches_the_child() {
    let mut runner = ProcessRunner::new(CommandSpec::new("cat"));
    runner
        .set_input_reader(std::io::Cursor::new(b"fed through a reader".to_vec()))
        .unwrap();
    runner.execute().unwrap();
    assert_eq!(runner.stdout_text().unwrap(), "fed through a reader");
}

#[test]
fn test_absent_input_closes_stdin_instead_of_hanging() {
    // Without an immediate EOF on stdin, cat would block until the
    // safety timeout kills it.
    let result = run(CommandSpec::new("cat").timeout(Duration::from_secs(5))).unwrap();
    assert!(result.success());
    assert!(!result.timed_out);
    assert!(result.stdout.is_empty());
}

// ============================================================================
// Environment and working directory
// ============================================================================

#[test]
fn test_env_overlay_is_merged_over_inherited() {
    // $PATH proves inheritance survived the overlay; $FLIM proves the
    // overlay applied.
    let result = run(sh("test -n \"$PATH\" && echo \"$FLIM\"").env("FLIM", "flam")).unwrap();
    assert!(result.success());
    assert_eq!(result.stdout_text(), "flam\n");
}

#[test]
fn test_working_directory_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    let canonical = dir.path().canonicalize().unwrap();
    let result = run(sh("pwd").working_dir(dir.path())).unwrap();
    assert!(result.success());
    assert_eq!(
        std::path::PathBuf::from(result.stdout_trimmed()),
        canonical
    );
}

// ============================================================================
// Timeout enforcement
// ============================================================================

#[test]
fn test_timeout_kills_the_child_promptly() {
    let start = Instant::now();
    let result = run(CommandSpec::new("sleep")
        .arg("5")
        .timeout(Duration::from_millis(100)))
    .unwrap();
    let elapsed = start.elapsed();

    assert!(result.timed_out);
    assert_eq!(result.exit_code, TIMEOUT_EXIT_CODE);
    assert!(elapsed >= Duration::from_millis(100));
    // Detection latency is bounded by the poll interval, far below the
    // child's own 5 s runtime.
    assert!(elapsed < Duration::from_secs(1), "took {elapsed:?}");
}

#[test]
fn test_fast_child_beats_its_timeout() {
    let result = run(sh("echo quick").timeout(Duration::from_secs(5))).unwrap();
    assert!(!result.timed_out);
    assert_eq!(result.stdout_text(), "quick\n");
}

// ============================================================================
// Lifecycle contract
// ============================================================================

#[test]
fn test_runner_cannot_execute_twice() {
    let mut runner = ProcessRunner::new(CommandSpec::new("true"));
    runner.execute().unwrap();
    assert_eq!(runner.exit_code().unwrap(), 0);

    assert!(matches!(
        runner.execute(),
        Err(ProcWardenError::InvalidPhaseTransition { .. })
    ));
    // The first run's result is untouched.
    assert_eq!(runner.exit_code().unwrap(), 0);
}

#[test]
fn test_accessors_answer_only_after_completion() {
    let mut runner = ProcessRunner::new(sh("echo later"));
    assert!(matches!(
        runner.stdout_text(),
        Err(ProcWardenError::WrongPhase { .. })
    ));
    runner.execute().unwrap();
    assert_eq!(runner.stdout_text().unwrap(), "later\n");
}

// ============================================================================
// Raw (no-collect) mode
// ============================================================================

#[test]
fn test_raw_mode_hands_over_readable_pipes() {
    let mut runner = ProcessRunner::new(sh("printf hi; printf err >&2").collect_output(false));
    runner.execute().unwrap();
    assert!(runner.exit_code().is_ok());

    let mut out = String::new();
    runner
        .take_raw_stdout()
        .unwrap()
        .read_to_string(&mut out)
        .unwrap();
    assert_eq!(out, "hi");

    let mut err = String::new();
    runner
        .take_raw_stderr()
        .unwrap()
        .read_to_string(&mut err)
        .unwrap();
    assert_eq!(err, "err");

    // A pipe is surrendered at most once.
    assert!(matches!(
        runner.take_raw_stdout(),
        Err(ProcWardenError::RawStreamUnavailable(_))
    ));
}

#[test]
fn test_raw_pipes_refused_when_collecting() {
    let mut runner = ProcessRunner::new(sh("echo collected"));
    runner.execute().unwrap();
    assert!(matches!(
        runner.take_raw_stdout(),
        Err(ProcWardenError::RawStreamUnavailable(_))
    ));
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_runners_do_not_cross_contaminate() {
    let workers: Vec<_> = [b'a', b'b']
        .into_iter()
        .map(|fill| {
            std::thread::spawn(move || {
                let result = run(filler(FIVE_MB, fill as char)).unwrap();
                assert!(result.success());
                assert_eq!(result.stdout.len(), FIVE_MB);
                assert!(result.stdout.iter().all(|&b| b == fill));
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }
}

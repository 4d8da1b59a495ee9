//! Background stream tasks.
//!
//! Draining the child's output and error pipes runs on dedicated threads,
//! in parallel with the controller's polling loop. Both drainers must be
//! running before any blocking wait on the child: a child that fills an
//! undrained OS pipe buffer blocks forever, and the controller would
//! stall with it.

use std::io::{Read, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Instant;

use tracing::{debug, trace, warn};

use super::sink::CappedBuffer;

/// Read size for chunks pulled from the child's pipes.
const READ_BUFFER_SIZE: usize = 4096;

/// A running drainer task for one child output pipe.
///
/// The thread copies the pipe into a shared [`CappedBuffer`] and reports
/// exactly one completion message over a channel. The controller waits on
/// that channel with a bound; a drainer that outlives the bound is
/// abandoned and the bytes collected so far are kept.
pub(crate) struct DrainHandle {
    label: &'static str,
    sink: Arc<Mutex<CappedBuffer>>,
    done: Receiver<std::io::Result<u64>>,
}

impl DrainHandle {
    /// Spawn a thread that drains `source` to end-of-stream, keeping at
    /// most `limit` bytes.
    pub fn spawn<R>(source: R, limit: Option<usize>, label: &'static str) -> Self
    where
        R: Read + Send + 'static,
    {
        let sink = Arc::new(Mutex::new(CappedBuffer::with_limit(limit)));
        let (tx, done) = mpsc::channel();
        let writer = Arc::clone(&sink);
        thread::spawn(move || {
            let outcome = drain(source, &writer);
            // The controller may have stopped listening already.
            let _ = tx.send(outcome);
        });
        Self { label, sink, done }
    }

    /// Wait for the drainer to finish, but no longer than `deadline`,
    /// then freeze and return whatever the sink holds.
    ///
    /// Read errors and a missed deadline are logged, never propagated:
    /// the run proceeds with possibly-incomplete output either way.
    pub fn finish(self, deadline: Instant) -> Vec<u8> {
        let grace = deadline.saturating_duration_since(Instant::now());
        match self.done.recv_timeout(grace) {
            Ok(Ok(copied)) => trace!(stream = self.label, bytes = copied, "stream drained"),
            Ok(Err(err)) => warn!(
                stream = self.label,
                error = %err,
                "read error while draining; captured bytes may be incomplete"
            ),
            Err(RecvTimeoutError::Timeout) => warn!(
                stream = self.label,
                "drainer still running past the grace period; abandoning it"
            ),
            Err(RecvTimeoutError::Disconnected) => warn!(
                stream = self.label,
                "drainer exited without reporting completion"
            ),
        }

        // The abandoned thread may still hold a clone of the Arc, so the
        // buffer is taken out from under the lock rather than unwrapped.
        let mut sink = self
            .sink
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        std::mem::take(&mut *sink).into_bytes()
    }
}

fn drain<R: Read>(mut source: R, sink: &Mutex<CappedBuffer>) -> std::io::Result<u64> {
    let mut buf = [0u8; READ_BUFFER_SIZE];
    let mut copied = 0u64;
    loop {
        match source.read(&mut buf) {
            Ok(0) => return Ok(copied),
            Ok(n) => {
                copied += n as u64;
                let mut sink = sink.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                sink.push_chunk(&buf[..n]);
            }
            Err(ref err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
}

/// Feed `input` to the child's stdin on a background thread, then close
/// the pipe. Without input, the handle is dropped immediately so the
/// child sees end-of-file instead of waiting for interactive input that
/// will never arrive.
///
/// Write failures are swallowed after a debug log: input feeding is
/// best-effort and never fails the run.
pub(crate) fn spawn_feeder<W>(stdin: W, input: Option<Box<dyn Read + Send>>)
where
    W: Write + Send + 'static,
{
    let Some(mut source) = input else {
        drop(stdin);
        return;
    };
    thread::spawn(move || {
        let mut stdin = stdin;
        match std::io::copy(&mut source, &mut stdin) {
            Ok(copied) => trace!(bytes = copied, "stdin fed to completion"),
            Err(err) => debug!(error = %err, "stdin feed failed; run continues without it"),
        }
        // Dropping the writer here closes the child's stdin.
    });
}

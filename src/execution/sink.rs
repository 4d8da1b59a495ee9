//! Bounded byte capture buffer.

/// Default number of bytes captured from each of the child's output
/// streams before further bytes are discarded.
pub const DEFAULT_STREAM_CAP: usize = 31_000;

/// Upper bound on the buffer's initial allocation, so a very large cap
/// does not pre-reserve memory the run may never use.
const MAX_INITIAL_CAPACITY: usize = 1_000_000;

/// Growable byte buffer with an optional capacity limit.
///
/// Writes past the limit are counted and dropped; a write never blocks
/// and never fails. A limit of `None` means the buffer grows until memory
/// runs out.
///
/// The buffer is written by exactly one drainer task and read only after
/// that task has finished (or been abandoned), so it carries no internal
/// synchronization.
#[derive(Debug, Default)]
pub struct CappedBuffer {
    bytes: Vec<u8>,
    limit: Option<usize>,
    discarded: u64,
}

impl CappedBuffer {
    /// Create a buffer bounded by `limit` bytes, or unbounded for `None`.
    pub fn with_limit(limit: Option<usize>) -> Self {
        let bytes = match limit {
            Some(max) => Vec::with_capacity(max.min(MAX_INITIAL_CAPACITY)),
            None => Vec::new(),
        };
        Self {
            bytes,
            limit,
            discarded: 0,
        }
    }

    /// Append a chunk, keeping at most the remaining capacity and
    /// discarding the rest.
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        let keep = match self.limit {
            Some(max) => max.saturating_sub(self.bytes.len()).min(chunk.len()),
            None => chunk.len(),
        };
        self.bytes.extend_from_slice(&chunk[..keep]);
        self.discarded += (chunk.len() - keep) as u64;
    }

    /// Number of bytes currently held.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Number of bytes dropped because the limit was reached.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Freeze the buffer into its collected bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

//! Byte offset to line/column mapping for streamed input.

use std::cell::RefCell;
use std::io::{self, Read};
use std::rc::Rc;

/// Offsets of every newline seen so far in a stream.
#[derive(Debug, Default)]
pub struct LineIndex {
    newlines: Vec<u64>,
    consumed: u64,
}

impl LineIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a chunk of bytes that has just been read.
    pub fn record(&mut self, chunk: &[u8]) {
        for (i, byte) in chunk.iter().enumerate() {
            if *byte == b'\n' {
                self.newlines.push(self.consumed + i as u64);
            }
        }
        self.consumed += chunk.len() as u64;
    }

    /// Number of bytes recorded.
    #[must_use]
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Map a byte offset to a 1-based (line, column) pair.
    ///
    /// Only offsets that have already been read map reliably.
    #[must_use]
    pub fn position(&self, offset: u64) -> (usize, usize) {
        let before = self.newlines.partition_point(|&nl| nl < offset);
        let line_start = match before {
            0 => 0,
            n => self.newlines[n - 1] + 1,
        };
        let column = usize::try_from(offset - line_start).unwrap_or(usize::MAX);
        (before + 1, column + 1)
    }
}

/// Reader adapter that feeds every chunk it passes through into a
/// shared [`LineIndex`].
pub struct LineTracker<R> {
    inner: R,
    index: Rc<RefCell<LineIndex>>,
}

impl<R: Read> LineTracker<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            index: Rc::new(RefCell::new(LineIndex::new())),
        }
    }

    /// Handle to the index, usable while the tracker is owned by a
    /// tokenizer.
    #[must_use]
    pub fn index(&self) -> Rc<RefCell<LineIndex>> {
        Rc::clone(&self.index)
    }
}

impl<R: Read> Read for LineTracker<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.index.borrow_mut().record(&buf[..n]);
        Ok(n)
    }
}

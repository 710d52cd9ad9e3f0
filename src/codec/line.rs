//! Line splitter for the serial stream
//!
//! The gateway emits one frame per `\n` terminated text line. Serial reads
//! deliver arbitrary chunks, so this splitter accumulates bytes and emits
//! complete lines with their terminator intact.
//!
//! Nothing is ever discarded: a partial line can be flushed on read
//! timeout, and an over-long line is emitted as-is once it exceeds the
//! buffer limit.

use crate::constants::MAX_LINE_LENGTH;
use bytes::Bytes;

/// Splitter state for the serial stream
pub struct LineSplitter {
    buffer: Vec<u8>,
    /// Maximum pending bytes before a forced emit
    max_line_length: usize,
}

impl Default for LineSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::with_max_line_length(MAX_LINE_LENGTH)
    }

    pub fn with_max_line_length(max_line_length: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(256),
            max_line_length,
        }
    }

    /// Feed new data and extract complete lines (terminator included)
    pub fn feed(&mut self, data: &[u8]) -> Vec<Bytes> {
        let mut lines = Vec::new();

        for &byte in data {
            self.buffer.push(byte);

            if byte == b'\n' || self.buffer.len() >= self.max_line_length {
                lines.push(Bytes::from(std::mem::take(&mut self.buffer)));
            }
        }

        lines
    }

    /// Take whatever partial line is pending
    pub fn flush(&mut self) -> Option<Bytes> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(Bytes::from(std::mem::take(&mut self.buffer)))
        }
    }

    /// Number of bytes waiting for a terminator
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.feed(b"RQ --- 01:033496\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].as_ref(), b"RQ --- 01:033496\n");
        assert_eq!(splitter.pending(), 0);
    }

    #[test]
    fn test_split_across_reads() {
        let mut splitter = LineSplitter::new();
        assert!(splitter.feed(b"RQ --- 01:").is_empty());
        assert_eq!(splitter.pending(), 10);

        let lines = splitter.feed(b"033496\r\nI --- ");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].as_ref(), b"RQ --- 01:033496\r\n");
        assert_eq!(splitter.flush().unwrap().as_ref(), b"I --- ");
        assert!(splitter.flush().is_none());
    }

    #[test]
    fn test_multiple_lines_in_one_read() {
        let mut splitter = LineSplitter::new();
        let lines = splitter.feed(b"a\nb\n\nc");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].as_ref(), b"a\n");
        assert_eq!(lines[1].as_ref(), b"b\n");
        assert_eq!(lines[2].as_ref(), b"\n");
        assert_eq!(splitter.pending(), 1);
    }

    #[test]
    fn test_over_long_line_is_emitted_not_dropped() {
        let mut splitter = LineSplitter::with_max_line_length(4);
        let lines = splitter.feed(b"abcdefg");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].as_ref(), b"abcd");
        assert_eq!(splitter.flush().unwrap().as_ref(), b"efg");
    }
}

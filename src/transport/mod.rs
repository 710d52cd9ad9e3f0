//! Transport abstraction for the serial line
//!
//! Separates how lines flow from what the filter does with them:
//! - **LineLink**: read one line, write bytes
//! - **SerialTransport**: the real gateway on a serial port
//!
//! The pass-through loop owns its link exclusively. It is the only
//! reader and the only writer.

pub mod serial;

pub use serial::SerialTransport;

use crate::error::Result;
use bytes::Bytes;

/// A line-oriented, bidirectional byte channel
pub trait LineLink {
    /// Read the next line
    ///
    /// Returns `Ok(None)` when no data arrived within the read timeout.
    /// A returned line carries its terminator when one was received.
    fn read_line(&mut self) -> Result<Option<Bytes>>;

    /// Write bytes to the line (no acknowledgement)
    fn write_all(&mut self, data: &[u8]) -> Result<()>;
}

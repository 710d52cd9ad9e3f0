//! Serial transport for the RAMSES II gateway
//!
//! Blocking reads with a short timeout so the loop stays responsive:
//! - `read_line` keeps reading until a line completes or a read times out
//! - a timeout with a partial line pending returns the partial bytes
//!
//! Nothing read from the port is held back longer than one timeout.

use super::LineLink;
use crate::codec::LineSplitter;
use crate::constants::{SERIAL_BUFFER_SIZE, SERIAL_READ_TIMEOUT_MS};
use crate::error::{BridgeError, Result};
use bytes::Bytes;
use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::time::Duration;
use tracing::debug;

/// Serial transport for the gateway
///
/// # Example
///
/// ```ignore
/// let mut link = SerialTransport::open("/dev/ttyUSB0", 115_200)?;
/// while let Some(line) = link.read_line()? {
///     link.write_all(&line)?;
/// }
/// ```
pub struct SerialTransport {
    port_name: String,
    port: Box<dyn serialport::SerialPort>,
    splitter: LineSplitter,
    ready: VecDeque<Bytes>,
}

impl SerialTransport {
    /// Open a serial port (8N1, no flow control)
    pub fn open(port_name: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(port_name, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(SERIAL_READ_TIMEOUT_MS))
            .open()
            .map_err(|e| BridgeError::SerialOpen {
                port: port_name.to_string(),
                source: std::io::Error::other(e.to_string()),
            })?;

        debug!("Opened {} @ {} baud", port_name, baud_rate);

        Ok(Self {
            port_name: port_name.to_string(),
            port,
            splitter: LineSplitter::new(),
            ready: VecDeque::new(),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl LineLink for SerialTransport {
    fn read_line(&mut self) -> Result<Option<Bytes>> {
        read_line_from(&mut self.port, &mut self.splitter, &mut self.ready)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.port.write_all(data)?;
        self.port.flush()?;
        Ok(())
    }
}

/// Read until a line completes or a read times out
///
/// Lines beyond the first from one read wait in `ready` for the next call.
fn read_line_from<R: Read>(
    port: &mut R,
    splitter: &mut LineSplitter,
    ready: &mut VecDeque<Bytes>,
) -> Result<Option<Bytes>> {
    let mut buf = [0u8; SERIAL_BUFFER_SIZE];

    loop {
        if let Some(line) = ready.pop_front() {
            return Ok(Some(line));
        }

        match port.read(&mut buf) {
            Ok(0) => return Ok(splitter.flush()),
            Ok(n) => ready.extend(splitter.feed(&buf[..n])),
            Err(e) if e.kind() == ErrorKind::TimedOut => return Ok(splitter.flush()),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(source) => return Err(BridgeError::SerialIo { source }),
        }
    }
}

//! Codec layer for RAMSES II text lines
//!
//! Separates framing concerns from transport:
//! - **LineSplitter**: How bytes from the serial port become lines
//! - **ramses**: How a line becomes a frame and back
//!
//! Decoding is total. Anything the decoder does not recognise is
//! reported as `None` and must be forwarded unchanged by the caller.

pub mod line;
pub mod ramses;

pub use line::LineSplitter;
pub use ramses::{decode, encode, RamsesFrame};

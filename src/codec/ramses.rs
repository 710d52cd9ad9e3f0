//! RAMSES II line codec
//!
//! Wire format (space separated, newline terminated):
//!
//! ```text
//! RQ --- 01:033496 10:061315 --:------ 1F09 003 5A 00 FF
//! |  |   |         |         |         |    |   payload (hex bytes)
//! |  |   src       dst       addr3     verb length
//! |  separator
//! direction
//! ```
//!
//! The first seven tokens are kept verbatim as the header so that an
//! unmodified frame re-encodes to exactly the same text.

/// Number of verbatim header tokens (direction .. length)
const HEADER_TOKENS: usize = 7;

/// Minimum token count for a line to be considered a frame
const MIN_TOKENS: usize = 8;

const SRC_INDEX: usize = 2;
const DST_INDEX: usize = 3;
const VERB_INDEX: usize = 5;

/// A decoded RAMSES II frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RamsesFrame {
    /// Message code (e.g. `0x1F09`)
    pub verb: u16,
    /// Source device address
    pub src: String,
    /// Destination device address
    pub dst: String,
    /// Payload bytes
    pub payload: Vec<u8>,
    /// Header tokens preserved for re-encoding
    pub header: Vec<String>,
}

impl RamsesFrame {
    /// Raw CH setpoint (first payload byte)
    pub fn ch_setpoint(&self) -> Option<u8> {
        self.payload.first().copied()
    }

    /// Replace the raw CH setpoint, growing an empty payload if needed
    pub fn set_ch_setpoint(&mut self, value: u8) {
        match self.payload.first_mut() {
            Some(first) => *first = value,
            None => self.payload.push(value),
        }
    }
}

/// Decode one line into a frame
///
/// Bytes that are not valid UTF-8 are dropped before tokenising.
/// Returns `None` for anything that is not a well-formed frame.
pub fn decode(line: &[u8]) -> Option<RamsesFrame> {
    let text: String = line.utf8_chunks().map(|chunk| chunk.valid()).collect();
    let parts: Vec<&str> = text.split_whitespace().collect();

    if parts.len() < MIN_TOKENS {
        return None;
    }

    let verb = u16::from_str_radix(parts[VERB_INDEX], 16).ok()?;
    let payload = parts[HEADER_TOKENS..]
        .iter()
        .map(|token| u8::from_str_radix(token, 16).ok())
        .collect::<Option<Vec<u8>>>()?;

    Some(RamsesFrame {
        verb,
        src: parts[SRC_INDEX].to_string(),
        dst: parts[DST_INDEX].to_string(),
        payload,
        header: parts[..HEADER_TOKENS]
            .iter()
            .map(|token| token.to_string())
            .collect(),
    })
}

/// Encode a frame back into a newline-terminated line
///
/// Payload bytes are always rendered as two-digit uppercase hex.
pub fn encode(frame: &RamsesFrame) -> Vec<u8> {
    let mut out = frame.header.join(" ");
    for byte in &frame.payload {
        out.push_str(&format!(" {:02X}", byte));
    }
    out.push('\n');
    out.into_bytes()
}

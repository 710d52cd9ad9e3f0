//! evohome-mitm - transparent CH setpoint limiter
//!
//! Sits between a RAMSES II serial gateway and the bus. Every line is
//! forwarded exactly once; only the controller -> OTB `1F09` frame may be
//! rewritten, clamped to a ceiling and rate limited on the way up.
//!
//! ```text
//! serial -> LineSplitter -> decode -> is_relevant -> ceiling/ramp -> encode -> serial
//!                                                       ^
//!                                    MQTT listener -----'
//! ```

pub mod bridge;
pub mod ceiling;
pub mod cli;
pub mod codec;
pub mod config;
pub mod constants;
pub mod error;
pub mod filter;
pub mod logging;
pub mod mqtt;
pub mod ramp;
pub mod transport;

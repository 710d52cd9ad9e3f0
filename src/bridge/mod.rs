//! Pass-through bridge between the gateway and the bus
//!
//! Every line read from the serial link is written back exactly once.
//! Only the controller -> OTB CH setpoint frame may leave modified.

pub mod session;
pub mod stats;

pub use session::{Decision, Passthrough, Step};
pub use stats::{Snapshot, Stats};

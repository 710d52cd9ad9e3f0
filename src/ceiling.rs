//! Shared CH ceiling
//!
//! The effective ceiling is the MQTT override when one was received
//! within the staleness timeout, otherwise the static default. Written by
//! the override listener, read by the pass-through loop on every
//! relevant frame. Value and timestamp live behind one lock so a reader
//! never sees one without the other.

use crate::constants::{RAW_MAX, RAW_MIN};
use parking_lot::Mutex;
use std::time::{Duration, Instant};

/// Last accepted override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Override {
    pub value: u8,
    pub received_at: Instant,
}

/// Ceiling cell shared between the loop and the override listener
#[derive(Debug)]
pub struct Ceiling {
    default: u8,
    timeout: Duration,
    current: Mutex<Option<Override>>,
}

impl Ceiling {
    pub fn new(default: u8, timeout: Duration) -> Self {
        Self {
            default,
            timeout,
            current: Mutex::new(None),
        }
    }

    /// Static ceiling used when no fresh override exists
    pub fn default_value(&self) -> u8 {
        self.default
    }

    /// Store an override; values outside the valid raw range are ignored
    ///
    /// Returns whether the value was accepted.
    pub fn set_override(&self, value: i64, now: Instant) -> bool {
        if !(i64::from(RAW_MIN)..=i64::from(RAW_MAX)).contains(&value) {
            return false;
        }
        *self.current.lock() = Some(Override {
            value: value as u8,
            received_at: now,
        });
        true
    }

    /// Last stored override, fresh or not
    pub fn last_override(&self) -> Option<Override> {
        *self.current.lock()
    }

    /// Ceiling in effect at `now`
    pub fn effective(&self, now: Instant) -> u8 {
        match *self.current.lock() {
            Some(o) if now.saturating_duration_since(o.received_at) <= self.timeout => o.value,
            _ => self.default,
        }
    }
}

//! Traffic statistics for the pass-through loop
//!
//! Thread-safe counters, lock-free atomics for all operations.
//! Written by the loop, read by anyone holding the `Arc`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Line counters
#[derive(Debug, Default)]
pub struct Stats {
    /// Lines read from the serial port
    lines_read: AtomicU64,
    /// Lines written on the normal path
    forwarded: AtomicU64,
    /// Controller -> OTB setpoint frames seen
    relevant: AtomicU64,
    /// Frames re-encoded with a changed setpoint
    mutated: AtomicU64,
    /// Iterations that went through the failsafe path
    failovers: AtomicU64,
    /// Failed write attempts (normal or failsafe)
    write_errors: AtomicU64,
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub lines_read: u64,
    pub forwarded: u64,
    pub relevant: u64,
    pub mutated: u64,
    pub failovers: u64,
    pub write_errors: u64,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_relevant(&self) {
        self.relevant.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_mutated(&self) {
        self.mutated.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_failover(&self) {
        self.failovers.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_write_error(&self) {
        self.write_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            relevant: self.relevant.load(Ordering::Relaxed),
            mutated: self.mutated.load(Ordering::Relaxed),
            failovers: self.failovers.load(Ordering::Relaxed),
            write_errors: self.write_errors.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read={} forwarded={} relevant={} mutated={} failovers={} write_errors={}",
            self.lines_read,
            self.forwarded,
            self.relevant,
            self.mutated,
            self.failovers,
            self.write_errors
        )
    }
}

//! Ramp limiter for the forwarded CH setpoint
//!
//! Bounds how fast the forwarded value may rise. Decreases and idle
//! demand are always adopted immediately; only increases are slowed to
//! `step` raw units per whole `interval` elapsed.
//!
//! All values are raw half-degree units (raw / 2 = °C).

use std::time::{Duration, Instant};

/// Ramp configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RampPolicy {
    /// Raw value at or below which demand counts as idle
    pub idle_threshold: u8,
    /// Largest increase per whole interval
    pub step: u8,
    /// Length of one ramp interval
    pub interval: Duration,
    /// When false the limiter only clamps (no rate limit)
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy)]
struct Forwarded {
    value: u8,
    at: Instant,
}

/// Stateful rate limiter, owned by the pass-through loop
#[derive(Debug)]
pub struct RampLimiter {
    policy: RampPolicy,
    last: Option<Forwarded>,
}

impl RampLimiter {
    pub fn new(policy: RampPolicy) -> Self {
        Self { policy, last: None }
    }

    pub fn policy(&self) -> &RampPolicy {
        &self.policy
    }

    /// Last forwarded value, if any
    pub fn last_forwarded(&self) -> Option<u8> {
        self.last.map(|f| f.value)
    }

    /// Value to forward for `target` (already clamped to the ceiling)
    pub fn apply(&mut self, target: u8, now: Instant) -> u8 {
        if !self.policy.enabled {
            return target;
        }

        let Some(last) = self.last else {
            self.record(target, now);
            return target;
        };

        if target <= self.policy.idle_threshold || target <= last.value {
            self.record(target, now);
            return target;
        }

        let elapsed = now.saturating_duration_since(last.at);
        let intervals = elapsed.as_nanos() / self.policy.interval.as_nanos().max(1);
        if intervals == 0 {
            return last.value;
        }

        let max_up = intervals.saturating_mul(u128::from(self.policy.step));
        let ceiling = u128::from(last.value).saturating_add(max_up);
        // Bounded by target, so always fits in a u8
        let next = u128::from(target).min(ceiling) as u8;

        if next != last.value {
            self.record(next, now);
        }
        next
    }

    fn record(&mut self, value: u8, at: Instant) {
        self.last = Some(Forwarded { value, at });
    }
}

//! Pass-through session - read, decide, write
//!
//! The session handles:
//! - Decoding each line and picking out the CH setpoint frame
//! - Clamping to the shared ceiling and ramping the forwarded value
//! - Writing exactly one line per line read
//! - The failsafe path when anything in an iteration fails
//!
//! The session does NOT handle:
//! - Opening the serial port (that's the caller's responsibility)
//! - Receiving ceiling overrides (see `mqtt`)

use super::stats::{Snapshot, Stats};
use crate::ceiling::Ceiling;
use crate::codec;
use crate::constants::{FAILSAFE_PAUSE_MS, STATS_LOG_INTERVAL_SECS};
use crate::error::{BridgeError, Result};
use crate::filter::{is_relevant, DeviceId};
use crate::ramp::{RampLimiter, RampPolicy};
use crate::transport::LineLink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// What to write for one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Write the original bytes unchanged
    Forward,
    /// Write a re-encoded frame with a new setpoint
    Mutate {
        actual: u8,
        forwarded: u8,
        line: Vec<u8>,
    },
}

/// Outcome of one loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Nothing arrived within the read timeout
    Idle,
    /// Original bytes written
    Forwarded,
    /// Modified frame written
    Mutated { actual: u8, forwarded: u8 },
    /// Iteration failed; original bytes (if any) written once more
    FailedOver,
}

/// Pass-through loop over a line link
///
/// # Example
///
/// ```ignore
/// let session = Passthrough::new(link, controller_id, otb_id, ceiling, policy, stats);
/// let summary = session.run(shutdown);
/// ```
pub struct Passthrough<L: LineLink> {
    link: L,
    controller_id: DeviceId,
    otb_id: DeviceId,
    ceiling: Arc<Ceiling>,
    ramp: RampLimiter,
    stats: Arc<Stats>,
    failsafe_pause: Duration,
}

impl<L: LineLink> Passthrough<L> {
    pub fn new(
        link: L,
        controller_id: DeviceId,
        otb_id: DeviceId,
        ceiling: Arc<Ceiling>,
        policy: RampPolicy,
        stats: Arc<Stats>,
    ) -> Self {
        Self {
            link,
            controller_id,
            otb_id,
            ceiling,
            ramp: RampLimiter::new(policy),
            stats,
            failsafe_pause: Duration::from_millis(FAILSAFE_PAUSE_MS),
        }
    }

    /// Override the pause taken after a failsafe pass-through
    pub fn with_failsafe_pause(mut self, pause: Duration) -> Self {
        self.failsafe_pause = pause;
        self
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Run until `shutdown` is set, returning the final counters
    pub fn run(mut self, shutdown: Arc<AtomicBool>) -> Snapshot {
        let report_every = Duration::from_secs(STATS_LOG_INTERVAL_SECS);
        let mut last_report = Instant::now();

        while !shutdown.load(Ordering::Relaxed) {
            self.step();

            if last_report.elapsed() >= report_every {
                debug!("Stats: {}", self.stats.snapshot());
                last_report = Instant::now();
            }
        }

        self.stats.snapshot()
    }

    /// One read-decide-write iteration
    ///
    /// Never fails: errors are handled by the failsafe path.
    pub fn step(&mut self) -> Step {
        let raw = match self.link.read_line() {
            Ok(Some(line)) if !line.is_empty() => line,
            Ok(_) => return Step::Idle,
            Err(e) => {
                self.fail_over(None, &e);
                return Step::FailedOver;
            }
        };
        self.stats.add_read();

        match self.forward(&raw, Instant::now()) {
            Ok(step) => step,
            Err(e) => {
                self.fail_over(Some(&raw[..]), &e);
                Step::FailedOver
            }
        }
    }

    /// Decide what to write for `raw` at `now`
    pub fn decide(&mut self, raw: &[u8], now: Instant) -> Result<Decision> {
        let Some(mut frame) = codec::decode(raw) else {
            return Ok(Decision::Forward);
        };
        if !is_relevant(&frame, &self.controller_id, &self.otb_id) {
            return Ok(Decision::Forward);
        }
        self.stats.add_relevant();

        // Decoded frames always carry a payload byte
        let Some(actual) = frame.ch_setpoint() else {
            return Ok(Decision::Forward);
        };

        // Idle demand is never clamped
        let target = if actual <= self.ramp.policy().idle_threshold {
            actual
        } else {
            actual.min(self.ceiling.effective(now))
        };
        let forwarded = self.ramp.apply(target, now);

        if forwarded == actual {
            return Ok(Decision::Forward);
        }

        frame.set_ch_setpoint(forwarded);
        Ok(Decision::Mutate {
            actual,
            forwarded,
            line: codec::encode(&frame),
        })
    }

    fn forward(&mut self, raw: &[u8], now: Instant) -> Result<Step> {
        let step = match self.decide(raw, now)? {
            Decision::Forward => {
                self.write(raw)?;
                Step::Forwarded
            }
            Decision::Mutate {
                actual,
                forwarded,
                line,
            } => {
                self.write(&line)?;
                self.stats.add_mutated();
                info!(
                    "MUTATE CH {:.1} -> {:.1} °C",
                    f32::from(actual) / 2.0,
                    f32::from(forwarded) / 2.0
                );
                Step::Mutated { actual, forwarded }
            }
        };
        self.stats.add_forwarded();
        Ok(step)
    }

    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.link
            .write_all(data)
            .inspect_err(|_| self.stats.add_write_error())
    }

    /// Forward what arrived, swallow any second failure, pause briefly
    fn fail_over(&mut self, raw: Option<&[u8]>, err: &BridgeError) {
        self.stats.add_failover();

        if let Some(raw) = raw.filter(|r| !r.is_empty()) {
            if let Err(e) = self.write(raw) {
                debug!("Failsafe write failed: {}", e);
            }
        }

        warn!("Pass-through after error: {}", err);
        std::thread::sleep(self.failsafe_pause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use std::collections::VecDeque;

    const SETPOINT_5A: &[u8] = b"I --- 01:033496 10:061315 --:------ 1F09 003 5A 00 00\n";

    /// In-memory link: scripted reads, recorded writes
    #[derive(Default)]
    struct ScriptedLink {
        reads: VecDeque<Result<Option<Bytes>>>,
        writes: Vec<Vec<u8>>,
        fail_writes: usize,
    }

    impl ScriptedLink {
        fn with_lines(lines: &[&[u8]]) -> Self {
            Self {
                reads: lines
                    .iter()
                    .map(|l| Ok(Some(Bytes::copy_from_slice(l))))
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl LineLink for ScriptedLink {
        fn read_line(&mut self) -> Result<Option<Bytes>> {
            self.reads.pop_front().unwrap_or(Ok(None))
        }

        fn write_all(&mut self, data: &[u8]) -> Result<()> {
            self.writes.push(data.to_vec());
            if self.fail_writes > 0 {
                self.fail_writes -= 1;
                return Err(std::io::Error::other("write failed").into());
            }
            Ok(())
        }
    }

    fn session(link: ScriptedLink, ceiling: u8) -> Passthrough<ScriptedLink> {
        Passthrough::new(
            link,
            "01:033496".parse().unwrap(),
            "10:061315".parse().unwrap(),
            Arc::new(Ceiling::new(ceiling, Duration::from_secs(1800))),
            RampPolicy {
                idle_threshold: 20,
                step: 4,
                interval: Duration::from_secs(30),
                enabled: true,
            },
            Arc::new(Stats::new()),
        )
        .with_failsafe_pause(Duration::ZERO)
    }

    #[test]
    fn test_decide_under_ceiling_forwards() {
        let mut s = session(ScriptedLink::default(), 90);
        assert_eq!(
            s.decide(SETPOINT_5A, Instant::now()).unwrap(),
            Decision::Forward
        );
    }

    #[test]
    fn test_decide_clamps_to_ceiling() {
        let mut s = session(ScriptedLink::default(), 64);
        match s.decide(SETPOINT_5A, Instant::now()).unwrap() {
            Decision::Mutate {
                actual,
                forwarded,
                line,
            } => {
                assert_eq!(actual, 90);
                assert_eq!(forwarded, 64);
                assert_eq!(
                    line,
                    b"I --- 01:033496 10:061315 --:------ 1F09 003 40 00 00\n".to_vec()
                );
            }
            other => panic!("Expected Mutate, got {:?}", other),
        }
    }

    #[test]
    fn test_decide_idle_ignores_ceiling() {
        let mut s = session(ScriptedLink::default(), 30);
        s.ramp = RampLimiter::new(RampPolicy {
            idle_threshold: 40,
            ..*s.ramp.policy()
        });
        let line = b"I --- 01:033496 10:061315 --:------ 1F09 003 24 00 00\n";
        assert_eq!(s.decide(line, Instant::now()).unwrap(), Decision::Forward);
    }

    #[test]
    fn test_decide_short_setpoint_line_forwards() {
        let mut s = session(ScriptedLink::default(), 64);
        let line = b"I --- 01:033496 10:061315 --:------ 1F09 000 \n";
        assert_eq!(s.decide(line, Instant::now()).unwrap(), Decision::Forward);
        assert_eq!(s.stats.snapshot().relevant, 0);
    }

    #[test]
    fn test_decide_ramps_rise_after_drop() {
        let mut s = session(ScriptedLink::default(), 90);
        let t0 = Instant::now();
        let low = b"I --- 01:033496 10:061315 --:------ 1F09 003 3C 00 00\n";

        assert_eq!(s.decide(low, t0).unwrap(), Decision::Forward);
        match s.decide(SETPOINT_5A, t0 + Duration::from_secs(31)).unwrap() {
            Decision::Mutate { forwarded, .. } => assert_eq!(forwarded, 0x3C + 4),
            other => panic!("Expected Mutate, got {:?}", other),
        }
    }

    #[test]
    fn test_step_idle_does_not_write() {
        let mut s = session(ScriptedLink::default(), 90);
        assert_eq!(s.step(), Step::Idle);
        assert!(s.link().writes.is_empty());
    }

    #[test]
    fn test_step_writes_once() {
        let mut s = session(ScriptedLink::with_lines(&[SETPOINT_5A]), 64);
        assert_eq!(
            s.step(),
            Step::Mutated {
                actual: 90,
                forwarded: 64
            }
        );
        assert_eq!(s.link().writes.len(), 1);
    }

    #[test]
    fn test_step_write_failure_retries_raw_once() {
        let mut link = ScriptedLink::with_lines(&[SETPOINT_5A]);
        link.fail_writes = 1;
        let mut s = session(link, 64);

        assert_eq!(s.step(), Step::FailedOver);
        let writes = &s.link().writes;
        assert_eq!(writes.len(), 2);
        // Second attempt is the original, unmodified line
        assert_eq!(writes[1], SETPOINT_5A.to_vec());

        let snap = s.stats.snapshot();
        assert_eq!(snap.failovers, 1);
        assert_eq!(snap.write_errors, 1);
        assert_eq!(snap.forwarded, 0);
    }

    #[test]
    fn test_step_double_write_failure_is_swallowed() {
        let mut link = ScriptedLink::with_lines(&[SETPOINT_5A, b"next\n"]);
        link.fail_writes = 2;
        let mut s = session(link, 90);

        assert_eq!(s.step(), Step::FailedOver);
        assert_eq!(s.step(), Step::Forwarded);
        assert_eq!(s.link().writes.len(), 3);
        assert_eq!(s.stats.snapshot().write_errors, 2);
    }

    #[test]
    fn test_step_read_error_writes_nothing() {
        let mut link = ScriptedLink::default();
        link.reads
            .push_back(Err(std::io::Error::other("read failed").into()));
        let mut s = session(link, 90);

        assert_eq!(s.step(), Step::FailedOver);
        assert!(s.link().writes.is_empty());
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let s = session(ScriptedLink::default(), 90);
        let shutdown = Arc::new(AtomicBool::new(true));
        assert_eq!(s.run(shutdown), Snapshot::default());
    }
}

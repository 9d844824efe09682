//! Rolling-counter continuity monitor.
//!
//! The producer increments a 4-bit counter with every command. A step of
//! more than one (mod 16) between consecutive valid frames means frames
//! were lost on the way; this is reported but never faults the ECU.

use std::time::Instant;

use abs_common::consts::COUNTER_MASK;
use tracing::warn;

/// A detected gap in the rolling counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discontinuity {
    /// When the offending frame was accepted.
    pub at: Instant,
    /// Counter of the previous valid frame.
    pub from: u8,
    /// Counter of the offending frame.
    pub to: u8,
    /// Forward distance `(to - from) mod 16`.
    pub jump: u8,
}

/// Tracks the counter of the last valid command frame.
#[derive(Debug, Default)]
pub struct CounterMonitor {
    last: Option<u8>,
    discontinuities: u64,
}

impl CounterMonitor {
    /// Create a monitor with no reference counter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the counter of a checksum-valid frame.
    ///
    /// Returns a [`Discontinuity`] when the counter advanced by more than
    /// one. A repeated counter (step 0) is tolerated, and the first frame
    /// after construction only seeds the reference. The reference survives
    /// command timeouts, so frames lost during a silence show up as a gap.
    pub fn observe(&mut self, counter: u8, now: Instant) -> Option<Discontinuity> {
        let counter = counter & COUNTER_MASK;
        let gap = self.last.and_then(|from| {
            let jump = counter.wrapping_sub(from) & COUNTER_MASK;
            (jump > 1).then_some(Discontinuity {
                at: now,
                from,
                to: counter,
                jump,
            })
        });
        self.last = Some(counter);

        if let Some(d) = gap {
            self.discontinuities += 1;
            warn!(
                from = d.from,
                to = d.to,
                jump = d.jump,
                "Rolling counter jump ({} -> {})",
                d.from,
                d.to
            );
        }
        gap
    }

    /// Counter of the last valid frame, if any.
    pub fn last(&self) -> Option<u8> {
        self.last
    }

    /// Total discontinuities reported so far.
    pub fn discontinuities(&self) -> u64 {
        self.discontinuities
    }
}

//! Nominal command producer.
//!
//! Stands in for the upstream ECU when running with `--simulate`: one
//! checksum-valid `Brake_Req_Level` frame per period, the counter rolling
//! mod 16 and the level stepping through a fixed sweep.

use std::time::{Duration, Instant};

use abs_common::can::codec::CommandFrame;
use abs_common::can::frame::RawFrame;
use abs_common::consts::COUNTER_MASK;

/// Level sweep, each step held for [`FRAMES_PER_LEVEL`] frames.
pub const LEVEL_SWEEP: [u8; 5] = [0, 10, 50, 90, 100];

/// Frames sent per sweep step.
pub const FRAMES_PER_LEVEL: u32 = 10;

/// Periodic command generator.
#[derive(Debug)]
pub struct NominalProducer {
    command_id: u32,
    period: Duration,
    next_due: Option<Instant>,
    counter: u8,
    frames: u32,
}

impl NominalProducer {
    /// Create a producer; the first frame is due on the first poll.
    pub fn new(command_id: u32, period: Duration) -> Self {
        Self {
            command_id,
            period,
            next_due: None,
            counter: 0,
            frames: 0,
        }
    }

    /// Return the next frame if it is due at `now`.
    pub fn poll(&mut self, now: Instant) -> Option<RawFrame> {
        let due = *self.next_due.get_or_insert(now);
        if now < due {
            return None;
        }

        let step = (self.frames / FRAMES_PER_LEVEL) as usize % LEVEL_SWEEP.len();
        let frame = CommandFrame::new(LEVEL_SWEEP[step], self.counter).encode(self.command_id);

        self.counter = (self.counter + 1) & COUNTER_MASK;
        self.frames = self.frames.wrapping_add(1);
        let next = due + self.period;
        self.next_due = Some(if next <= now { now + self.period } else { next });
        Some(frame)
    }

    /// Next emission, once the producer has started.
    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Frames produced so far.
    pub fn frames(&self) -> u32 {
        self.frames
    }
}

//! Heartbeat publisher.
//!
//! Emits one heartbeat per period on a fixed deadline grid. An emission
//! more than [`HEARTBEAT_TOLERANCE_MS`] late re-anchors the grid at the
//! actual send time, so consecutive heartbeats are never closer than
//! `period - tolerance`. The alive counter is incremented before each emission and wraps 255 -> 0. A send
//! failure is logged and the counter stays advanced, so the consumer sees
//! a gap rather than a repeat.

use std::time::{Duration, Instant};

use abs_common::can::codec::HeartbeatFrame;
use abs_common::can::transport::CanTransport;
use abs_common::consts::HEARTBEAT_TOLERANCE_MS;
use abs_common::fault::FaultBits;
use tracing::{trace, warn};

/// Periodic heartbeat state.
#[derive(Debug)]
pub struct HeartbeatPublisher {
    heartbeat_id: u32,
    period: Duration,
    alive: u8,
    next_due: Option<Instant>,
    sent: u64,
    send_failures: u64,
}

impl HeartbeatPublisher {
    /// Create a publisher for `heartbeat_id`; nothing is due until [`start`](Self::start).
    pub fn new(heartbeat_id: u32, period: Duration) -> Self {
        Self {
            heartbeat_id,
            period,
            alive: 0,
            next_due: None,
            sent: 0,
            send_failures: 0,
        }
    }

    /// Schedule the first heartbeat at `now`.
    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    /// Whether a heartbeat is due at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.is_some_and(|due| now >= due)
    }

    /// Emit a heartbeat if one is due.
    ///
    /// Returns the frame content when a heartbeat was attempted, whether or
    /// not the transport accepted it.
    pub fn tick(
        &mut self,
        now: Instant,
        faults: FaultBits,
        transport: &mut dyn CanTransport,
    ) -> Option<HeartbeatFrame> {
        let due = self.next_due.filter(|due| now >= *due)?;

        self.alive = self.alive.wrapping_add(1);
        let heartbeat = HeartbeatFrame {
            alive_counter: self.alive,
            fault_bits: faults,
        };

        match transport.send(&heartbeat.encode(self.heartbeat_id)) {
            Ok(()) => {
                self.sent += 1;
                trace!(
                    alive = self.alive,
                    faults = faults.bits(),
                    "Heartbeat sent"
                );
            }
            Err(e) => {
                self.send_failures += 1;
                if self.send_failures <= 10 || self.send_failures % 100 == 0 {
                    warn!(
                        "Heartbeat send failed (#{}, alive={}): {}",
                        self.send_failures, self.alive, e
                    );
                }
            }
        }

        let late = now.duration_since(due);
        let next = if late > Duration::from_millis(HEARTBEAT_TOLERANCE_MS) {
            now + self.period
        } else {
            due + self.period
        };
        self.next_due = Some(next);
        Some(heartbeat)
    }

    /// Next scheduled emission.
    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Counter carried by the last heartbeat.
    pub fn alive_counter(&self) -> u8 {
        self.alive
    }

    /// Heartbeats accepted by the transport.
    pub fn sent(&self) -> u64 {
        self.sent
    }

    /// Heartbeats the transport rejected.
    pub fn send_failures(&self) -> u64 {
        self.send_failures
    }

    /// Configured period.
    pub fn period(&self) -> Duration {
        self.period
    }
}

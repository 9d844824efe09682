//! Command freshness watcher.

use std::time::{Duration, Instant};

/// Result of a freshness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutStatus {
    /// A valid command arrived within the timeout window.
    Alive,
    /// No valid command within the window, or none ever received.
    Expired,
}

/// Tracks the instant of the last valid command.
#[derive(Debug)]
pub struct TimeoutWatcher {
    timeout: Duration,
    last_valid: Option<Instant>,
}

impl TimeoutWatcher {
    /// Create a watcher that has not seen any command yet.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_valid: None,
        }
    }

    /// Record a checksum-valid command frame.
    pub fn on_valid_frame(&mut self, now: Instant) {
        self.last_valid = Some(now);
    }

    /// Check freshness at `now`.
    ///
    /// Before the first valid frame the stream counts as expired, so the
    /// actuator stays at 0 % until a producer has been heard.
    pub fn tick(&self, now: Instant) -> TimeoutStatus {
        match self.silence(now) {
            Some(silent) if silent <= self.timeout => TimeoutStatus::Alive,
            _ => TimeoutStatus::Expired,
        }
    }

    /// Time since the last valid command, if any.
    pub fn silence(&self, now: Instant) -> Option<Duration> {
        self.last_valid.map(|t| now.saturating_duration_since(t))
    }

    /// Instant of the last valid command.
    pub fn last_valid(&self) -> Option<Instant> {
        self.last_valid
    }

    /// Configured timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

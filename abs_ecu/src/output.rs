//! Actuator controller.
//!
//! Maps a validated command level to a duty cycle, applies the safe-state
//! override and owns the actuator handle. The actuator is only written when
//! the commanded duty changes; a failed write is retried on the next commit.

use std::time::{Duration, Instant};

use abs_common::actuator::{Actuator, ActuatorError, DutyPercent};
use abs_common::config::PwmConfig;
use abs_common::fault::FaultBits;
use tracing::{debug, info, warn};

/// Write and latency counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputStats {
    /// Successful duty writes.
    pub writes: u64,
    /// Rejected duty writes.
    pub write_failures: u64,
    /// Commits that matched the current duty and skipped the write.
    pub unchanged: u64,
    /// Worst validate-to-commit latency seen.
    pub max_latency: Duration,
    /// Commits slower than the actuation deadline.
    pub latency_overruns: u64,
}

/// Drives the brake actuator.
pub struct ActuatorController {
    actuator: Box<dyn Actuator>,
    requested: DutyPercent,
    committed: Option<DutyPercent>,
    deadline: Duration,
    enabled: bool,
    stats: OutputStats,
}

impl ActuatorController {
    /// Wrap `actuator`; `deadline` bounds the validate-to-commit latency.
    pub fn new(actuator: Box<dyn Actuator>, deadline: Duration) -> Self {
        Self {
            actuator,
            requested: DutyPercent::ZERO,
            committed: None,
            deadline,
            enabled: false,
            stats: OutputStats::default(),
        }
    }

    /// Duty for `level` under `faults`.
    ///
    /// Identity mapping clamped to 100, overridden to 0 while any fault in
    /// [`FaultBits::SAFE_STATE_MASK`] is set.
    pub fn apply(level: u8, faults: FaultBits) -> DutyPercent {
        if faults.forces_safe_state() {
            DutyPercent::ZERO
        } else {
            DutyPercent::from_level(level)
        }
    }

    /// Enable the actuator at 0 %.
    ///
    /// # Errors
    /// Propagates the actuator's enable or first write failure.
    pub fn enable(&mut self, config: &PwmConfig) -> Result<(), ActuatorError> {
        self.actuator.enable(config)?;
        self.enabled = true;
        self.actuator.set_duty_percent(DutyPercent::ZERO)?;
        self.committed = Some(DutyPercent::ZERO);
        self.requested = DutyPercent::ZERO;
        info!(
            "Actuator '{}' enabled at {} Hz, duty 0%",
            self.actuator.name(),
            config.frequency_hz
        );
        Ok(())
    }

    /// Record a validated command and drive the resulting duty.
    ///
    /// `validated_at` is the wall-clock instant the frame passed validation
    /// and is used for latency accounting only.
    pub fn command(&mut self, level: u8, faults: FaultBits, validated_at: Instant) -> DutyPercent {
        self.requested = DutyPercent::from_level(level);
        let duty = Self::apply(level, faults);
        if self.commit(duty) {
            self.record_latency(validated_at);
        }
        duty
    }

    /// Re-evaluate the last requested level against `faults`.
    pub fn refresh(&mut self, faults: FaultBits) -> DutyPercent {
        let duty = Self::apply(self.requested.get(), faults);
        self.commit(duty);
        duty
    }

    /// Forget the last requested level so a cleared fault cannot revive it.
    pub fn discard_request(&mut self) {
        if self.requested != DutyPercent::ZERO {
            debug!("Discarding stale request {}", self.requested);
        }
        self.requested = DutyPercent::ZERO;
    }

    /// Drive 0 % unconditionally and release the actuator.
    ///
    /// # Errors
    /// Returns the first failure; release is still attempted after a failed write.
    pub fn shutdown(&mut self) -> Result<(), ActuatorError> {
        if !self.enabled {
            return Ok(());
        }
        self.requested = DutyPercent::ZERO;
        let write = self.actuator.set_duty_percent(DutyPercent::ZERO);
        if let Err(e) = &write {
            warn!("Final 0% write failed: {}", e);
        }
        self.committed = write.is_ok().then_some(DutyPercent::ZERO);
        let release = self.actuator.disable();
        self.enabled = false;
        info!("Actuator '{}' released", self.actuator.name());
        write.and(release)
    }

    fn commit(&mut self, duty: DutyPercent) -> bool {
        if self.committed == Some(duty) {
            self.stats.unchanged += 1;
            return true;
        }
        match self.actuator.set_duty_percent(duty) {
            Ok(()) => {
                debug!("Duty {} committed", duty);
                self.committed = Some(duty);
                self.stats.writes += 1;
                true
            }
            Err(e) => {
                self.committed = None;
                self.stats.write_failures += 1;
                if self.stats.write_failures <= 10 || self.stats.write_failures % 1000 == 0 {
                    warn!(
                        "Actuator write #{} failed ({}): {}",
                        self.stats.write_failures, duty, e
                    );
                }
                false
            }
        }
    }

    fn record_latency(&mut self, validated_at: Instant) {
        let latency = validated_at.elapsed();
        if latency > self.stats.max_latency {
            self.stats.max_latency = latency;
        }
        if latency > self.deadline {
            self.stats.latency_overruns += 1;
            warn!(
                "Actuation latency {}us exceeds {}us",
                latency.as_micros(),
                self.deadline.as_micros()
            );
        }
    }

    /// Last duty acknowledged by the actuator; `None` after a failed write.
    pub fn committed(&self) -> Option<DutyPercent> {
        self.committed
    }

    /// Last requested level as a duty, before the safe-state override.
    pub fn requested(&self) -> DutyPercent {
        self.requested
    }

    /// Write and latency counters.
    pub fn stats(&self) -> &OutputStats {
        &self.stats
    }

    /// Whether `enable()` succeeded and `shutdown()` has not run.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

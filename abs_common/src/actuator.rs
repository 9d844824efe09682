//! Actuator trait, duty type and error types.

use std::fmt;
use thiserror::Error;

use crate::config::{AbsConfig, PwmConfig};
use crate::consts::MAX_LEVEL;

/// Error types for actuator operations.
#[derive(Debug, Clone, Error)]
pub enum ActuatorError {
    /// Output could not be acquired or configured at startup.
    #[error("Actuator enable failed: {0}")]
    EnableFailed(String),

    /// Duty write rejected by the output.
    #[error("Actuator write failed: {0}")]
    WriteFailed(String),

    /// Underlying I/O error.
    #[error("Actuator I/O error: {0}")]
    Io(String),
}

/// PWM duty cycle in percent, always within 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct DutyPercent(u8);

impl DutyPercent {
    /// Output off.
    pub const ZERO: Self = Self(0);
    /// Output fully on.
    pub const FULL: Self = Self(MAX_LEVEL);

    /// Linear identity mapping from a command level, clamped to 100.
    #[inline]
    pub const fn from_level(level: u8) -> Self {
        if level > MAX_LEVEL {
            Self(MAX_LEVEL)
        } else {
            Self(level)
        }
    }

    /// Percentage value.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Complement for active-low outputs.
    #[inline]
    pub const fn inverted(self) -> Self {
        Self(MAX_LEVEL - self.0)
    }

    /// Active time within a PWM period of `period_ns`.
    #[inline]
    pub const fn active_ns(self, period_ns: u64) -> u64 {
        period_ns * self.0 as u64 / MAX_LEVEL as u64
    }
}

impl fmt::Display for DutyPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Factory function type for creating actuator instances.
pub type ActuatorFactory = fn(&AbsConfig) -> Box<dyn Actuator>;

/// Interface of the brake actuator collaborator.
///
/// # Lifecycle
///
/// 1. `enable()` - once at startup with 0 % duty; failure is fatal
/// 2. `set_duty_percent()` - from the control loop
/// 3. `disable()` - on shutdown, after a final 0 % write
pub trait Actuator: Send {
    /// Returns the driver's unique identifier (e.g., "sysfs", "simulation").
    fn name(&self) -> &'static str;

    /// Acquire and configure the output at the fixed carrier frequency,
    /// leaving it driven at 0 %.
    ///
    /// # Errors
    /// Return `ActuatorError::EnableFailed` if the output cannot be acquired.
    fn enable(&mut self, config: &PwmConfig) -> Result<(), ActuatorError>;

    /// Drive the output at `duty`.
    ///
    /// # Errors
    /// Return `ActuatorError::WriteFailed` or `ActuatorError::Io` if the write fails.
    fn set_duty_percent(&mut self, duty: DutyPercent) -> Result<(), ActuatorError>;

    /// Release the output.
    ///
    /// # Errors
    /// Return `ActuatorError::Io` if the output could not be released cleanly.
    fn disable(&mut self) -> Result<(), ActuatorError>;
}

//! Prelude module for common re-exports.
//!
//! ```rust
//! use abs_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    AbsConfig, CanConfig, ConfigError, ConfigLoader, LogLevel, PwmConfig, SharedConfig,
    TimingConfig,
};

// ─── Wire ───────────────────────────────────────────────────────────
pub use crate::can::codec::{CommandFrame, FrameError, HeartbeatFrame, checksum};
pub use crate::can::frame::RawFrame;
pub use crate::can::transport::{BusEvent, BusState, CanTransport, Received, TransportError};

// ─── Faults ─────────────────────────────────────────────────────────
pub use crate::fault::{FaultBits, FaultKind, FaultLatch};

// ─── Actuator ───────────────────────────────────────────────────────
pub use crate::actuator::{Actuator, ActuatorError, DutyPercent};

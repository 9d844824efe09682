//! Fault kinds and the heartbeat fault bitmask.
//!
//! The bit assignment is part of the wire contract and must not change:
//!
//! | Bit | Mask | Fault   | Latching                      |
//! |-----|------|---------|-------------------------------|
//! | 0   | 0x01 | TIMEOUT | level (cleared by valid frame)|
//! | 1   | 0x02 | CHKFAIL | renewing 500 ms hold          |
//! | 2   | 0x04 | RANGE   | renewing 500 ms hold          |
//! | 3   | 0x08 | BUSOFF  | level (cleared by recovery)   |
//!
//! TIMEOUT and BUSOFF force the actuator into the safe state (0 % duty).

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// Heartbeat `FaultBits` byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FaultBits: u8 {
        /// No valid command within the timeout.
        const TIMEOUT = 0x01;
        /// Command frame checksum mismatch.
        const CHKFAIL = 0x02;
        /// Command level above 100.
        const RANGE   = 0x04;
        /// CAN controller is bus-off.
        const BUSOFF  = 0x08;
    }
}

impl FaultBits {
    /// Faults that override the actuator to 0 %.
    pub const SAFE_STATE_MASK: Self =
        Self::from_bits_truncate(Self::TIMEOUT.bits() | Self::BUSOFF.bits());

    /// Returns true if any fault forcing the safe state is set.
    #[inline]
    pub const fn forces_safe_state(&self) -> bool {
        self.intersects(Self::SAFE_STATE_MASK)
    }
}

impl Default for FaultBits {
    fn default() -> Self {
        Self::empty()
    }
}

/// How a fault kind is cleared once asserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultLatch {
    /// Asserted while the condition holds, cleared explicitly when it resolves.
    Level,
    /// Asserted on each violation, cleared by the sweep once the hold window
    /// passes without a new violation.
    Hold,
}

/// Individual fault kinds tracked by the ECU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultKind {
    /// Communication timeout.
    Timeout,
    /// Level out of range.
    Range,
    /// Checksum failure.
    ChkFail,
    /// Bus-off.
    BusOff,
}

impl FaultKind {
    /// All fault kinds, in bit order of their index.
    pub const ALL: [FaultKind; 4] = [
        FaultKind::Timeout,
        FaultKind::Range,
        FaultKind::ChkFail,
        FaultKind::BusOff,
    ];

    /// Number of fault kinds.
    pub const COUNT: usize = Self::ALL.len();

    /// Heartbeat bit for this kind.
    pub const fn bit(self) -> FaultBits {
        match self {
            FaultKind::Timeout => FaultBits::TIMEOUT,
            FaultKind::Range => FaultBits::RANGE,
            FaultKind::ChkFail => FaultBits::CHKFAIL,
            FaultKind::BusOff => FaultBits::BUSOFF,
        }
    }

    /// Latching behavior for this kind.
    pub const fn latch(self) -> FaultLatch {
        match self {
            FaultKind::Timeout | FaultKind::BusOff => FaultLatch::Level,
            FaultKind::Range | FaultKind::ChkFail => FaultLatch::Hold,
        }
    }

    /// Dense index into per-kind tables.
    pub const fn index(self) -> usize {
        match self {
            FaultKind::Timeout => 0,
            FaultKind::Range => 1,
            FaultKind::ChkFail => 2,
            FaultKind::BusOff => 3,
        }
    }

    /// Upper-case name as used in logs and test reports.
    pub const fn name(self) -> &'static str {
        match self {
            FaultKind::Timeout => "TIMEOUT",
            FaultKind::Range => "RANGE",
            FaultKind::ChkFail => "CHKFAIL",
            FaultKind::BusOff => "BUSOFF",
        }
    }
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

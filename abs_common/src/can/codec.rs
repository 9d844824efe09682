//! Command and heartbeat frame codec.
//!
//! ```text
//! Command   (0x180, 8 bytes): [0]=Level [1]=RollingCounter [2]=Checksum [3..7]=0x00
//! Heartbeat (0x280, 8 bytes): [0]=AliveCounter [1]=FaultBits [2..7]=0x00
//! ```
//!
//! `Checksum = 0xFF - ((Level + Counter) & 0xFF)`.

use static_assertions::const_assert_eq;
use thiserror::Error;

use crate::can::frame::RawFrame;
use crate::consts::{COUNTER_MASK, FRAME_LEN, MAX_LEVEL};
use crate::fault::FaultBits;

const_assert_eq!(FRAME_LEN, 8);

/// Decode failures for inbound frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Identifier or length does not match the expected frame. Not a fault.
    #[error("Malformed frame: id=0x{id:X} extended={extended} len={len}")]
    Malformed {
        /// Received identifier.
        id: u32,
        /// Whether the identifier was extended.
        extended: bool,
        /// Received DLC.
        len: usize,
    },

    /// Shape matches but the checksum byte is wrong.
    #[error("Checksum invalid: expected 0x{expected:02X}, received 0x{received:02X}")]
    ChecksumInvalid {
        /// Checksum computed from level and counter.
        expected: u8,
        /// Checksum byte carried by the frame.
        received: u8,
    },
}

/// Compute the command checksum. Only the low nibble of `counter` is used.
#[inline]
pub const fn checksum(level: u8, counter: u8) -> u8 {
    0xFF - level.wrapping_add(counter & COUNTER_MASK)
}

/// Decoded brake request command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    /// Requested brake level, valid 0-100.
    pub level: u8,
    /// 4-bit rolling counter.
    pub counter: u8,
    /// Checksum byte as carried on the wire.
    pub checksum: u8,
}

impl CommandFrame {
    /// Build a correctly signed command.
    pub const fn new(level: u8, counter: u8) -> Self {
        let counter = counter & COUNTER_MASK;
        Self {
            level,
            counter,
            checksum: checksum(level, counter),
        }
    }

    /// Decode a raw frame received on the bus.
    ///
    /// # Errors
    /// - [`FrameError::Malformed`] if the identifier, identifier format or
    ///   length does not match the command frame.
    /// - [`FrameError::ChecksumInvalid`] if the checksum does not match.
    pub fn decode(frame: &RawFrame, command_id: u32) -> Result<Self, FrameError> {
        if frame.id != command_id || frame.extended || frame.len != FRAME_LEN {
            return Err(FrameError::Malformed {
                id: frame.id,
                extended: frame.extended,
                len: frame.len,
            });
        }

        let level = frame.data[0];
        let counter = frame.data[1] & COUNTER_MASK;
        let received = frame.data[2];
        let expected = checksum(level, counter);
        if expected != received {
            return Err(FrameError::ChecksumInvalid { expected, received });
        }

        Ok(Self {
            level,
            counter,
            checksum: received,
        })
    }

    /// Serialize into an 8-byte standard frame.
    pub fn encode(&self, command_id: u32) -> RawFrame {
        let mut data = [0u8; FRAME_LEN];
        data[0] = self.level;
        data[1] = self.counter;
        data[2] = self.checksum;
        RawFrame::standard(command_id, &data)
    }

    /// True when the level is within 0-100.
    #[inline]
    pub const fn in_range(&self) -> bool {
        self.level <= MAX_LEVEL
    }
}

/// Periodic diagnostic frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeartbeatFrame {
    /// Liveness counter, wraps at 256.
    pub alive_counter: u8,
    /// Current fault mask.
    pub fault_bits: FaultBits,
}

impl HeartbeatFrame {
    /// Serialize into an 8-byte standard frame.
    pub fn encode(&self, heartbeat_id: u32) -> RawFrame {
        let mut data = [0u8; FRAME_LEN];
        data[0] = self.alive_counter;
        data[1] = self.fault_bits.bits();
        RawFrame::standard(heartbeat_id, &data)
    }

    /// Parse a heartbeat. Unknown fault bits are dropped.
    ///
    /// # Errors
    /// [`FrameError::Malformed`] if the identifier or length does not match.
    pub fn decode(frame: &RawFrame, heartbeat_id: u32) -> Result<Self, FrameError> {
        if frame.id != heartbeat_id || frame.extended || frame.len != FRAME_LEN {
            return Err(FrameError::Malformed {
                id: frame.id,
                extended: frame.extended,
                len: frame.len,
            });
        }
        Ok(Self {
            alive_counter: frame.data[0],
            fault_bits: FaultBits::from_bits_truncate(frame.data[1]),
        })
    }
}

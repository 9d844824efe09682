//! In-memory representation of a classic CAN frame.

use crate::consts::FRAME_LEN;
use std::fmt;

/// Raw CAN frame as read from or written to the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawFrame {
    /// Arbitration identifier (11 or 29 bits).
    pub id: u32,
    /// True for a 29-bit extended identifier.
    pub extended: bool,
    /// Data Length Code (0 to 8).
    pub len: usize,
    /// Payload buffer; bytes past `len` are zero.
    pub data: [u8; FRAME_LEN],
}

impl RawFrame {
    /// Build a standard-identifier frame. Payload beyond eight bytes is dropped.
    pub fn standard(id: u32, payload: &[u8]) -> Self {
        let len = payload.len().min(FRAME_LEN);
        let mut data = [0u8; FRAME_LEN];
        data[..len].copy_from_slice(&payload[..len]);
        Self {
            id,
            extended: false,
            len,
            data,
        }
    }

    /// Build an extended-identifier frame.
    pub fn extended(id: u32, payload: &[u8]) -> Self {
        Self {
            extended: true,
            ..Self::standard(id, payload)
        }
    }

    /// Populated bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.data[..self.len.min(FRAME_LEN)]
    }
}

impl fmt::Display for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extended {
            write!(f, "{:08X}#", self.id)?;
        } else {
            write!(f, "{:03X}#", self.id)?;
        }
        for b in self.payload() {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

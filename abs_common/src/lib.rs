//! ABS Common Library
//!
//! Shared definitions for the ABS ECU workspace: the CAN wire contract,
//! fault bits, collaborator traits and configuration loading.
//!
//! # Module Structure
//!
//! - [`can`] - Raw frames, command/heartbeat codec, transport trait
//! - [`fault`] - Fault kinds and the heartbeat `FaultBits` mask
//! - [`actuator`] - Duty percentage type and actuator trait
//! - [`config`] - Configuration loading traits and types
//! - [`consts`] - Wire identifiers and timing defaults
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! abs_common = { workspace = true }
//! ```
//!
//! ```rust
//! use abs_common::can::codec::{checksum, CommandFrame};
//!
//! let cmd = CommandFrame::new(50, 3);
//! assert_eq!(cmd.checksum, checksum(50, 3));
//! ```

pub mod actuator;
pub mod can;
pub mod config;
pub mod consts;
pub mod fault;
pub mod prelude;

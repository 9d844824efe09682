//! CAN wire contract.
//!
//! This module contains the raw frame representation, the command and
//! heartbeat codec, and the transport trait the control loop talks to.

pub mod codec;
pub mod frame;
pub mod transport;

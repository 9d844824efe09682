//! # ABS ECU Library
//!
//! Brake-actuation loop of the ABS electronic control unit.
//!
//! The ECU consumes `Brake_Req_Level` commands from the CAN bus, validates
//! them, drives the brake actuator through PWM and publishes a heartbeat
//! carrying its fault state. Any loss of trust in the command stream forces
//! the actuator to 0 %.
//!
//! # Module Structure
//!
//! - [`core`] - `EcuCore`, the single-threaded control loop
//! - [`counter`] - rolling-counter continuity monitor
//! - [`fault`] - fault latching and hold windows
//! - [`timeout`] - command freshness watcher
//! - [`bus_state`] - bus-off tracking
//! - [`output`] - actuator controller (level to duty, safe-state override)
//! - [`heartbeat`] - periodic status publisher
//! - [`driver_registry`] - transport and actuator factory registration
//! - [`drivers`] - transport and actuator implementations
//! - [`error`] - top-level error type
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                         abs_ecu (single crate)                    │
//! │  ┌──────────────┐    ┌──────────────┐    ┌─────────────────────┐  │
//! │  │ CanTransport │◄──►│   EcuCore    │◄──►│  Driver Registry    │  │
//! │  │ (trait obj)  │    │ (event loop) │    │                     │  │
//! │  └──────────────┘    └──────┬───────┘    └─────────────────────┘  │
//! │                             │                                     │
//! │        ┌──────────┬─────────┼──────────┬────────────┐             │
//! │        ▼          ▼         ▼          ▼            ▼             │
//! │    counter     fault     timeout    bus_state   heartbeat         │
//! │                             │                                     │
//! │                             ▼                                     │
//! │                   ┌──────────────────┐                            │
//! │                   │ ActuatorController│──► Actuator (trait obj)   │
//! │                   └──────────────────┘                            │
//! └───────────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]

pub mod bus_state;
pub mod core;
pub mod counter;
pub mod driver_registry;
pub mod drivers;
pub mod error;
pub mod fault;
pub mod heartbeat;
pub mod output;
pub mod timeout;

// Re-export key types for convenience
pub use crate::core::{EcuCore, FrameOutcome, LoopStats};
pub use crate::driver_registry::DriverRegistry;
pub use crate::error::EcuError;

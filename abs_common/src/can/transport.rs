//! CAN transport trait and error types.
//!
//! The control loop owns exactly one transport and talks to it through
//! [`CanTransport`], which lets it run against SocketCAN on the target or an
//! in-process simulation during development and tests.

use std::time::Duration;
use thiserror::Error;

use crate::can::frame::RawFrame;
use crate::config::{AbsConfig, CanConfig};

/// Error types for transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Interface could not be acquired at startup.
    #[error("Failed to open CAN interface: {0}")]
    OpenFailed(String),

    /// Read or write on an open interface failed.
    #[error("CAN I/O error: {0}")]
    Io(String),

    /// Operation on a transport that is not open.
    #[error("CAN transport is closed")]
    Closed,
}

/// Controller state as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusState {
    /// Error-active or error-passive; frames flow.
    #[default]
    Active,
    /// Controller disconnected itself from the bus.
    BusOff,
}

/// Bus-state notifications pushed by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusEvent {
    /// Controller entered bus-off.
    BusOff,
    /// Controller recovered from bus-off.
    Recovered,
}

/// Outcome of one bounded receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Received {
    /// A frame arrived (any identifier).
    Frame(RawFrame),
    /// A bus-state notification arrived.
    Bus(BusEvent),
    /// Nothing arrived within the wait bound.
    Timeout,
}

/// Factory function type for creating transport instances.
///
/// Factories receive the full configuration so drivers can pick up
/// settings outside `[can]` (the simulated producer period, for one).
pub type TransportFactory = fn(&AbsConfig) -> Box<dyn CanTransport>;

/// Interface of the CAN transport collaborator.
///
/// # Lifecycle
///
/// 1. `open()` - once at startup; failure is fatal
/// 2. `receive()` / `send()` / `bus_state()` - from the control loop
/// 3. `close()` - on shutdown
///
/// # Timing Contracts
///
/// | Operation | Max Duration |
/// |-----------|--------------|
/// | `receive(timeout)` | `timeout` (+ scheduling jitter) |
/// | `send()` | non-blocking or bounded by the driver's write timeout |
pub trait CanTransport: Send {
    /// Returns the driver's unique identifier (e.g., "simulation", "socketcan").
    fn name(&self) -> &'static str;

    /// Acquire the interface.
    ///
    /// # Errors
    /// Return `TransportError::OpenFailed` if the interface is unavailable.
    fn open(&mut self, config: &CanConfig) -> Result<(), TransportError>;

    /// Wait at most `timeout` for the next frame or bus notification.
    ///
    /// # Errors
    /// `TransportError::Io` on a read failure, `TransportError::Closed` if not open.
    fn receive(&mut self, timeout: Duration) -> Result<Received, TransportError>;

    /// Transmit one frame.
    ///
    /// # Errors
    /// `TransportError::Io` on a write failure, `TransportError::Closed` if not open.
    fn send(&mut self, frame: &RawFrame) -> Result<(), TransportError>;

    /// Current controller state.
    fn bus_state(&self) -> BusState;

    /// Release the interface.
    ///
    /// # Errors
    /// Return `TransportError::Io` if the interface could not be released cleanly.
    fn close(&mut self) -> Result<(), TransportError>;
}

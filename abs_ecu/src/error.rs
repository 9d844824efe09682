//! Top-level error type for the ECU process.

use abs_common::actuator::ActuatorError;
use abs_common::can::transport::TransportError;
use abs_common::config::ConfigError;
use thiserror::Error;

/// Errors surfaced by `EcuCore` and the binary.
///
/// Only startup failures are fatal. Once the loop runs, transport and
/// actuator errors are counted and logged, and the loop keeps going.
#[derive(Debug, Error)]
pub enum EcuError {
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// CAN transport failure.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Brake actuator failure.
    #[error(transparent)]
    Actuator(#[from] ActuatorError),

    /// No driver registered under the requested name.
    #[error("Driver not found: {name} (available: {available})")]
    DriverNotFound {
        /// Requested driver name.
        name: String,
        /// Comma separated list of registered names.
        available: String,
    },

    /// Loop entry point called before `start()`.
    #[error("ECU core not started")]
    NotStarted,
}

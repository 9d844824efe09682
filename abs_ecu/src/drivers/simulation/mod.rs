//! Simulation drivers.
//!
//! In-process CAN bus and brake actuator for development and testing
//! without a CAN controller or PWM chip. Both come with a cloneable handle
//! that lets tests inject traffic and faults and inspect what the loop did.

mod actuator;
mod bus;
mod producer;

pub use actuator::{SimulatedActuator, SimulatedActuatorHandle};
pub use bus::{SimulatedBus, SimulatedBusHandle};
pub use producer::NominalProducer;

use abs_common::actuator::Actuator;
use abs_common::can::transport::CanTransport;
use abs_common::config::AbsConfig;

/// Factory: simulated bus fed by a nominal command producer.
pub fn create_transport(config: &AbsConfig) -> Box<dyn CanTransport> {
    Box::new(SimulatedBus::with_producer(
        config.can.command_id,
        config.timing.command_period(),
    ))
}

/// Factory: simulated actuator.
pub fn create_actuator(_config: &AbsConfig) -> Box<dyn Actuator> {
    let (actuator, _handle) = SimulatedActuator::new();
    Box::new(actuator)
}

//! Transport and actuator driver implementations.
//!
//! - [`simulation`] - in-process bus and actuator for development and testing
//! - [`sysfs`] - Linux sysfs PWM actuator
//! - `socketcan` - Linux SocketCAN transport (`socketcan` feature)
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement `CanTransport` or `Actuator` from `abs_common`
//! 3. Register the factory in [`register_all_drivers`]

pub mod simulation;
#[cfg(all(target_os = "linux", feature = "socketcan"))]
pub mod socketcan;
pub mod sysfs;

use crate::driver_registry::DriverRegistry;

/// Register all built-in drivers.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register_transport("simulation", simulation::create_transport);
    #[cfg(all(target_os = "linux", feature = "socketcan"))]
    registry.register_transport("socketcan", socketcan::create_transport);

    registry.register_actuator("simulation", simulation::create_actuator);
    registry.register_actuator("sysfs", sysfs::create_actuator);
}

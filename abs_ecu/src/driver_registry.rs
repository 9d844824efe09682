//! Driver registry for CAN transports and brake actuators.
//!
//! Maps driver names (as given on the command line) to factory functions.
//! Constructed at startup and queried once per collaborator; no global state.

use abs_common::actuator::{Actuator, ActuatorFactory};
use abs_common::can::transport::{CanTransport, TransportFactory};
use abs_common::config::AbsConfig;
use std::collections::HashMap;

use crate::drivers;
use crate::error::EcuError;

/// Registry of available transport and actuator drivers.
pub struct DriverRegistry {
    transports: HashMap<&'static str, TransportFactory>,
    actuators: HashMap<&'static str, ActuatorFactory>,
}

impl DriverRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            transports: HashMap::new(),
            actuators: HashMap::new(),
        }
    }

    /// Create a registry holding every driver compiled into this binary.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        drivers::register_all_drivers(&mut registry);
        registry
    }

    /// Register a transport factory.
    ///
    /// # Panics
    /// Panics if a transport with the same name is already registered.
    pub fn register_transport(&mut self, name: &'static str, factory: TransportFactory) {
        if self.transports.contains_key(name) {
            panic!("Transport '{name}' is already registered");
        }
        self.transports.insert(name, factory);
    }

    /// Register an actuator factory.
    ///
    /// # Panics
    /// Panics if an actuator with the same name is already registered.
    pub fn register_actuator(&mut self, name: &'static str, factory: ActuatorFactory) {
        if self.actuators.contains_key(name) {
            panic!("Actuator '{name}' is already registered");
        }
        self.actuators.insert(name, factory);
    }

    /// Create a transport instance by name.
    ///
    /// # Errors
    /// Returns `EcuError::DriverNotFound` if no transport with the given name is registered.
    pub fn create_transport(
        &self,
        name: &str,
        config: &AbsConfig,
    ) -> Result<Box<dyn CanTransport>, EcuError> {
        let factory = self
            .transports
            .get(name)
            .ok_or_else(|| not_found(name, self.list_transports()))?;
        Ok(factory(config))
    }

    /// Create an actuator instance by name.
    ///
    /// # Errors
    /// Returns `EcuError::DriverNotFound` if no actuator with the given name is registered.
    pub fn create_actuator(
        &self,
        name: &str,
        config: &AbsConfig,
    ) -> Result<Box<dyn Actuator>, EcuError> {
        let factory = self
            .actuators
            .get(name)
            .ok_or_else(|| not_found(name, self.list_actuators()))?;
        Ok(factory(config))
    }

    /// Registered transport names, sorted.
    pub fn list_transports(&self) -> Vec<&'static str> {
        sorted(self.transports.keys().copied().collect())
    }

    /// Registered actuator names, sorted.
    pub fn list_actuators(&self) -> Vec<&'static str> {
        sorted(self.actuators.keys().copied().collect())
    }
}

impl Default for DriverRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted(mut names: Vec<&'static str>) -> Vec<&'static str> {
    names.sort_unstable();
    names
}

fn not_found(name: &str, available: Vec<&'static str>) -> EcuError {
    EcuError::DriverNotFound {
        name: name.to_string(),
        available: available.join(", "),
    }
}

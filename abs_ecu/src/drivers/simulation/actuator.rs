//! Simulated brake actuator.

use std::collections::VecDeque;
use std::sync::Arc;

use abs_common::actuator::{Actuator, ActuatorError, DutyPercent};
use abs_common::config::PwmConfig;
use parking_lot::Mutex;
use tracing::{debug, info};

/// Duty writes retained for inspection.
const HISTORY_CAPACITY: usize = 1024;

#[derive(Debug, Default)]
struct ActuatorShared {
    enabled: bool,
    frequency_hz: u32,
    duty: Option<DutyPercent>,
    history: VecDeque<DutyPercent>,
    writes: u64,
    fail_enable: bool,
    fail_writes: bool,
}

/// Test-side view of a [`SimulatedActuator`].
#[derive(Debug, Clone)]
pub struct SimulatedActuatorHandle {
    shared: Arc<Mutex<ActuatorShared>>,
}

impl SimulatedActuatorHandle {
    /// Currently driven duty; `None` before the first write.
    pub fn duty(&self) -> Option<DutyPercent> {
        self.shared.lock().duty
    }

    /// Accepted duty writes, oldest first.
    pub fn history(&self) -> Vec<DutyPercent> {
        self.shared.lock().history.iter().copied().collect()
    }

    /// Number of accepted duty writes.
    pub fn write_count(&self) -> u64 {
        self.shared.lock().writes
    }

    /// Whether the output is enabled.
    pub fn is_enabled(&self) -> bool {
        self.shared.lock().enabled
    }

    /// Carrier frequency requested at enable.
    pub fn frequency_hz(&self) -> u32 {
        self.shared.lock().frequency_hz
    }

    /// Make `enable()` fail.
    pub fn fail_enable(&self, fail: bool) {
        self.shared.lock().fail_enable = fail;
    }

    /// Make every duty write fail until reset.
    pub fn fail_writes(&self, fail: bool) {
        self.shared.lock().fail_writes = fail;
    }
}

/// In-process actuator recording every duty it is driven at.
#[derive(Debug)]
pub struct SimulatedActuator {
    shared: Arc<Mutex<ActuatorShared>>,
}

impl SimulatedActuator {
    /// Create an actuator and its handle.
    pub fn new() -> (Self, SimulatedActuatorHandle) {
        let shared = Arc::new(Mutex::new(ActuatorShared::default()));
        let handle = SimulatedActuatorHandle {
            shared: Arc::clone(&shared),
        };
        (Self { shared }, handle)
    }
}

impl Actuator for SimulatedActuator {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn enable(&mut self, config: &PwmConfig) -> Result<(), ActuatorError> {
        let mut shared = self.shared.lock();
        if shared.fail_enable {
            return Err(ActuatorError::EnableFailed(
                "injected enable failure".to_string(),
            ));
        }
        shared.enabled = true;
        shared.frequency_hz = config.frequency_hz;
        info!(
            "Simulated actuator enabled (pwmchip{}/pwm{} @ {} Hz)",
            config.chip, config.channel, config.frequency_hz
        );
        Ok(())
    }

    fn set_duty_percent(&mut self, duty: DutyPercent) -> Result<(), ActuatorError> {
        let mut shared = self.shared.lock();
        if !shared.enabled {
            return Err(ActuatorError::WriteFailed("output not enabled".to_string()));
        }
        if shared.fail_writes {
            return Err(ActuatorError::WriteFailed(
                "injected write failure".to_string(),
            ));
        }
        shared.duty = Some(duty);
        shared.writes += 1;
        if shared.history.len() == HISTORY_CAPACITY {
            shared.history.pop_front();
        }
        shared.history.push_back(duty);
        debug!("sim duty {}", duty);
        Ok(())
    }

    fn disable(&mut self) -> Result<(), ActuatorError> {
        self.shared.lock().enabled = false;
        info!("Simulated actuator disabled");
        Ok(())
    }
}

//! Linux sysfs PWM actuator driver.
//!
//! Drives `/sys/class/pwm/pwmchipN/pwmM` (root configurable):
//!
//! ```text
//! enable():  export (if needed) -> enable=0 -> duty_cycle=0 -> period -> duty_cycle -> enable=1
//! set_duty:  duty_cycle
//! disable(): enable=0 -> unexport (only if exported here)
//! ```

mod pwm;

pub use pwm::SysfsPwm;

use abs_common::actuator::Actuator;
use abs_common::config::AbsConfig;

/// Factory: sysfs PWM actuator.
pub fn create_actuator(_config: &AbsConfig) -> Box<dyn Actuator> {
    Box::new(SysfsPwm::new())
}

//! sysfs PWM channel.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use abs_common::actuator::{Actuator, ActuatorError, DutyPercent};
use abs_common::config::PwmConfig;
use tracing::{debug, info, warn};

/// Polls for the channel directory after an export.
const EXPORT_SETTLE_POLLS: u32 = 10;
const EXPORT_SETTLE_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug)]
struct Channel {
    chip_dir: PathBuf,
    dir: PathBuf,
    channel: u32,
    period_ns: u64,
    active_low: bool,
    exported_here: bool,
}

/// Brake actuator on a sysfs PWM channel.
#[derive(Debug, Default)]
pub struct SysfsPwm {
    channel: Option<Channel>,
}

impl SysfsPwm {
    /// Create an unbound driver; the channel is acquired in `enable()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel directory once enabled.
    pub fn channel_dir(&self) -> Option<&Path> {
        self.channel.as_ref().map(|c| c.dir.as_path())
    }
}

fn write_attr(dir: &Path, attr: &str, value: impl ToString) -> Result<(), ActuatorError> {
    let path = dir.join(attr);
    fs::write(&path, value.to_string())
        .map_err(|e| ActuatorError::Io(format!("write {}: {}", path.display(), e)))
}

fn export(chip_dir: &Path, channel: u32, dir: &Path) -> Result<(), ActuatorError> {
    write_attr(chip_dir, "export", channel)
        .map_err(|e| ActuatorError::EnableFailed(e.to_string()))?;
    for _ in 0..EXPORT_SETTLE_POLLS {
        if dir.exists() {
            return Ok(());
        }
        thread::sleep(EXPORT_SETTLE_INTERVAL);
    }
    Err(ActuatorError::EnableFailed(format!(
        "{} did not appear after export",
        dir.display()
    )))
}

impl Actuator for SysfsPwm {
    fn name(&self) -> &'static str {
        "sysfs"
    }

    fn enable(&mut self, config: &PwmConfig) -> Result<(), ActuatorError> {
        let chip_dir = config.chip_path();
        let dir = config.channel_path();
        if !chip_dir.is_dir() {
            return Err(ActuatorError::EnableFailed(format!(
                "PWM chip {} not found",
                chip_dir.display()
            )));
        }

        let exported_here = !dir.exists();
        if exported_here {
            debug!("Exporting PWM channel {} on {}", config.channel, chip_dir.display());
            export(&chip_dir, config.channel, &dir)?;
        }

        let period_ns = config.period_ns();
        let idle = if config.active_low {
            DutyPercent::ZERO.inverted()
        } else {
            DutyPercent::ZERO
        };

        // duty_cycle must never exceed period, so zero it before changing period.
        let configure = || -> Result<(), ActuatorError> {
            write_attr(&dir, "enable", 0)?;
            write_attr(&dir, "duty_cycle", 0)?;
            write_attr(&dir, "period", period_ns)?;
            write_attr(&dir, "duty_cycle", idle.active_ns(period_ns))?;
            write_attr(&dir, "enable", 1)
        };
        configure().map_err(|e| ActuatorError::EnableFailed(e.to_string()))?;

        info!(
            "PWM {} enabled: period={}ns active_low={}",
            dir.display(),
            period_ns,
            config.active_low
        );
        self.channel = Some(Channel {
            chip_dir,
            dir,
            channel: config.channel,
            period_ns,
            active_low: config.active_low,
            exported_here,
        });
        Ok(())
    }

    fn set_duty_percent(&mut self, duty: DutyPercent) -> Result<(), ActuatorError> {
        let ch = self
            .channel
            .as_ref()
            .ok_or_else(|| ActuatorError::WriteFailed("PWM channel not enabled".to_string()))?;
        let level = if ch.active_low { duty.inverted() } else { duty };
        write_attr(&ch.dir, "duty_cycle", level.active_ns(ch.period_ns))
            .map_err(|e| ActuatorError::WriteFailed(e.to_string()))
    }

    fn disable(&mut self) -> Result<(), ActuatorError> {
        let Some(ch) = self.channel.take() else {
            return Ok(());
        };
        let result = write_attr(&ch.dir, "enable", 0);
        if let Err(e) = &result {
            warn!("Failed to disable PWM {}: {}", ch.dir.display(), e);
        }
        if ch.exported_here {
            write_attr(&ch.chip_dir, "unexport", ch.channel)?;
        }
        info!("PWM {} released", ch.dir.display());
        result
    }
}

//! Configuration loading traits and types.
//!
//! The ECU reads one TOML file into an immutable [`AbsConfig`] at startup.
//! Every section and field is optional; missing values take the defaults
//! from [`crate::consts`].
//!
//! # Usage
//!
//! ```rust,no_run
//! use abs_common::config::{AbsConfig, ConfigError, ConfigLoader};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let config = AbsConfig::load(Path::new("abs_ecu.toml"))?;
//!     config.validate()?;
//!     println!("{}", config.summary());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::consts::*;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Common process fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "abs-ecu-front"
/// build_id = "abs-ecu-0.1"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedConfig {
    /// Logging verbosity level.
    pub log_level: LogLevel,

    /// Application instance identifier.
    pub service_name: String,

    /// Build identifier reported in the startup line.
    pub build_id: String,
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            service_name: ECU_SERVICE_NAME.to_string(),
            build_id: concat!("abs-ecu-", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `service_name` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// CAN bus section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanConfig {
    /// SocketCAN interface name.
    pub interface: String,
    /// Nominal bitrate [bit/s], reported only.
    pub bitrate: u32,
    /// Command frame identifier.
    pub command_id: u32,
    /// Heartbeat frame identifier.
    pub heartbeat_id: u32,
}

impl Default for CanConfig {
    fn default() -> Self {
        Self {
            interface: DEFAULT_CAN_INTERFACE.to_string(),
            bitrate: DEFAULT_BITRATE,
            command_id: COMMAND_CAN_ID,
            heartbeat_id: HEARTBEAT_CAN_ID,
        }
    }
}

/// Timing section. All values in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Heartbeat period.
    pub heartbeat_period_ms: u64,
    /// Silence before TIMEOUT.
    pub command_timeout_ms: u64,
    /// RANGE / CHKFAIL hold window.
    pub fault_hold_ms: u64,
    /// Fault sweep period.
    pub sweep_period_ms: u64,
    /// Upper bound of one bounded receive.
    pub max_wait_ms: u64,
    /// Startup → first processing tick budget.
    pub startup_deadline_ms: u64,
    /// Validated frame → actuator commit budget.
    pub actuation_deadline_ms: u64,
    /// Command period of the simulated producer.
    pub command_period_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            heartbeat_period_ms: HEARTBEAT_PERIOD_MS,
            command_timeout_ms: COMMAND_TIMEOUT_MS,
            fault_hold_ms: FAULT_HOLD_MS,
            sweep_period_ms: SWEEP_PERIOD_MS,
            max_wait_ms: MAX_WAIT_MS,
            startup_deadline_ms: STARTUP_DEADLINE_MS,
            actuation_deadline_ms: ACTUATION_DEADLINE_MS,
            command_period_ms: COMMAND_PERIOD_MS,
        }
    }
}

impl TimingConfig {
    /// Heartbeat period.
    pub fn heartbeat_period(&self) -> Duration {
        Duration::from_millis(self.heartbeat_period_ms)
    }

    /// Command timeout.
    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }

    /// Fault hold window.
    pub fn fault_hold(&self) -> Duration {
        Duration::from_millis(self.fault_hold_ms)
    }

    /// Sweep period.
    pub fn sweep_period(&self) -> Duration {
        Duration::from_millis(self.sweep_period_ms)
    }

    /// Bounded receive wait.
    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }

    /// Startup deadline.
    pub fn startup_deadline(&self) -> Duration {
        Duration::from_millis(self.startup_deadline_ms)
    }

    /// Actuation deadline.
    pub fn actuation_deadline(&self) -> Duration {
        Duration::from_millis(self.actuation_deadline_ms)
    }

    /// Simulated command period.
    pub fn command_period(&self) -> Duration {
        Duration::from_millis(self.command_period_ms)
    }
}

/// Sysfs PWM section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PwmConfig {
    /// PWM class directory.
    pub sysfs_root: PathBuf,
    /// `pwmchip<N>` index.
    pub chip: u32,
    /// `pwm<M>` channel index.
    pub channel: u32,
    /// Fixed carrier frequency [Hz].
    pub frequency_hz: u32,
    /// Invert duty for active-low wiring.
    pub active_low: bool,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            sysfs_root: PathBuf::from(DEFAULT_PWM_SYSFS_ROOT),
            chip: 0,
            channel: 0,
            frequency_hz: PWM_FREQUENCY_HZ,
            active_low: false,
        }
    }
}

impl PwmConfig {
    /// `<root>/pwmchip<N>`.
    pub fn chip_path(&self) -> PathBuf {
        self.sysfs_root.join(format!("pwmchip{}", self.chip))
    }

    /// `<root>/pwmchip<N>/pwm<M>`.
    pub fn channel_path(&self) -> PathBuf {
        self.chip_path().join(format!("pwm{}", self.channel))
    }

    /// Carrier period [ns]. Zero if the frequency is zero.
    pub fn period_ns(&self) -> u64 {
        if self.frequency_hz == 0 {
            0
        } else {
            1_000_000_000 / self.frequency_hz as u64
        }
    }
}

/// Complete ECU configuration, built once and never mutated.
///
/// # TOML Example
///
/// ```toml
/// [can]
/// interface = "can0"
/// command_id = 0x180
/// heartbeat_id = 0x280
///
/// [timing]
/// heartbeat_period_ms = 200
///
/// [pwm]
/// chip = 0
/// channel = 0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AbsConfig {
    /// Process fields.
    pub shared: SharedConfig,
    /// Bus fields.
    pub can: CanConfig,
    /// Timing thresholds.
    pub timing: TimingConfig,
    /// Actuator output.
    pub pwm: PwmConfig,
}

impl AbsConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `service_name` is empty
    /// - a frame identifier exceeds 0x7FF or both identifiers are equal
    /// - any period or threshold is zero
    /// - `heartbeat_period_ms` lies outside 150-250
    /// - `max_wait_ms` is not below the heartbeat tolerance
    /// - `frequency_hz` is zero
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;

        for (name, id) in [
            ("command_id", self.can.command_id),
            ("heartbeat_id", self.can.heartbeat_id),
        ] {
            if id > MAX_STANDARD_ID {
                return Err(ConfigError::ValidationError(format!(
                    "{name} 0x{id:X} is not an 11-bit identifier"
                )));
            }
        }
        if self.can.command_id == self.can.heartbeat_id {
            return Err(ConfigError::ValidationError(
                "command_id and heartbeat_id must differ".to_string(),
            ));
        }

        let t = &self.timing;
        for (name, value) in [
            ("heartbeat_period_ms", t.heartbeat_period_ms),
            ("command_timeout_ms", t.command_timeout_ms),
            ("fault_hold_ms", t.fault_hold_ms),
            ("sweep_period_ms", t.sweep_period_ms),
            ("max_wait_ms", t.max_wait_ms),
            ("startup_deadline_ms", t.startup_deadline_ms),
            ("actuation_deadline_ms", t.actuation_deadline_ms),
            ("command_period_ms", t.command_period_ms),
        ] {
            if value == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be greater than zero"
                )));
            }
        }

        let hb_min = HEARTBEAT_PERIOD_MS - HEARTBEAT_TOLERANCE_MS;
        let hb_max = HEARTBEAT_PERIOD_MS + HEARTBEAT_TOLERANCE_MS;
        if !(hb_min..=hb_max).contains(&t.heartbeat_period_ms) {
            return Err(ConfigError::ValidationError(format!(
                "heartbeat_period_ms {} outside {hb_min}-{hb_max}",
                t.heartbeat_period_ms
            )));
        }
        if t.max_wait_ms >= HEARTBEAT_TOLERANCE_MS {
            return Err(ConfigError::ValidationError(format!(
                "max_wait_ms {} must be below the heartbeat tolerance of {HEARTBEAT_TOLERANCE_MS}",
                t.max_wait_ms
            )));
        }

        if self.pwm.frequency_hz == 0 {
            return Err(ConfigError::ValidationError(
                "frequency_hz must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// One-line rendering of the resolved configuration for the startup log.
    pub fn summary(&self) -> String {
        format!(
            "build={} service={} can={}@{}bps cmd_id=0x{:03X} hb_id=0x{:03X} \
             actuator={} pwm={}Hz{} timeout={}ms hold={}ms heartbeat={}ms max_wait={}ms",
            self.shared.build_id,
            self.shared.service_name,
            self.can.interface,
            self.can.bitrate,
            self.can.command_id,
            self.can.heartbeat_id,
            self.pwm.channel_path().display(),
            self.pwm.frequency_hz,
            if self.pwm.active_low { " active-low" } else { "" },
            self.timing.command_timeout_ms,
            self.timing.fault_hold_ms,
            self.timing.heartbeat_period_ms,
            self.timing.max_wait_ms,
        )
    }
}

/// Trait for loading configuration from TOML files.
///
/// This trait provides a default implementation that works with any type
/// implementing `serde::de::DeserializeOwned`.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// See the trait contract.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading configuration from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError::ParseError` if TOML syntax or types are invalid.
    fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

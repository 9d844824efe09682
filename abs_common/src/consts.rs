//! System-wide constants for the ABS ECU workspace.
//!
//! Single source of truth for wire identifiers, frame geometry and the
//! timing defaults every configuration section falls back to.

/// Canonical ECU service name (used for logging and as config default).
pub const ECU_SERVICE_NAME: &str = "abs_ecu";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/abs_ecu/abs_ecu.toml";

// ─── Wire ───────────────────────────────────────────────────────────

/// Brake request level command frame identifier.
pub const COMMAND_CAN_ID: u32 = 0x180;

/// ABS heartbeat frame identifier.
pub const HEARTBEAT_CAN_ID: u32 = 0x280;

/// Highest 11-bit standard identifier.
pub const MAX_STANDARD_ID: u32 = 0x7FF;

/// Classic CAN payload length; both ECU frames always carry eight bytes.
pub const FRAME_LEN: usize = 8;

/// Highest valid brake level; anything above is a range violation.
pub const MAX_LEVEL: u8 = 100;

/// Rolling counter modulus (4-bit counter).
pub const COUNTER_MODULUS: u8 = 16;

/// Mask applied to the rolling counter byte.
pub const COUNTER_MASK: u8 = COUNTER_MODULUS - 1;

// ─── Bus ────────────────────────────────────────────────────────────

/// Default SocketCAN interface.
pub const DEFAULT_CAN_INTERFACE: &str = "can0";

/// Default nominal bitrate [bit/s]. Informational; set with `ip link`.
pub const DEFAULT_BITRATE: u32 = 500_000;

// ─── Timing ─────────────────────────────────────────────────────────

/// Nominal command producer period [ms] (simulation traffic only).
pub const COMMAND_PERIOD_MS: u64 = 100;

/// Heartbeat period [ms].
pub const HEARTBEAT_PERIOD_MS: u64 = 200;

/// Allowed heartbeat jitter either side of the period [ms].
pub const HEARTBEAT_TOLERANCE_MS: u64 = 50;

/// Silence after the last valid command before TIMEOUT [ms].
pub const COMMAND_TIMEOUT_MS: u64 = 500;

/// RANGE / CHKFAIL hold window after the last violation [ms].
pub const FAULT_HOLD_MS: u64 = 500;

/// Fault sweep period [ms].
pub const SWEEP_PERIOD_MS: u64 = 10;

/// Upper bound of a single bounded receive wait [ms].
pub const MAX_WAIT_MS: u64 = 10;

/// First processing tick must happen within this time after startup [ms].
pub const STARTUP_DEADLINE_MS: u64 = 100;

/// Validated frame → actuator commit budget [ms].
pub const ACTUATION_DEADLINE_MS: u64 = 5;

// ─── PWM ────────────────────────────────────────────────────────────

/// Default sysfs PWM class directory.
pub const DEFAULT_PWM_SYSFS_ROOT: &str = "/sys/class/pwm";

/// Nominal PWM carrier frequency [Hz].
pub const PWM_FREQUENCY_HZ: u32 = 500;

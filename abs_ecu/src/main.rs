//! # ABS ECU Binary
//!
//! Brake-actuation loop: consumes `Brake_Req_Level` on CAN, drives the brake
//! PWM and publishes the ABS heartbeat.
//!
//! # Usage
//!
//! ```bash
//! # Target: SocketCAN + sysfs PWM (build with --features socketcan)
//! abs_ecu --config /etc/abs_ecu/abs_ecu.toml
//!
//! # Development: simulated bus with nominal traffic + simulated actuator
//! abs_ecu -s -v
//!
//! # Mix drivers explicitly
//! abs_ecu --transport socketcan --actuator simulation
//! ```

use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::Ordering;
use std::time::Instant;

use abs_common::config::{AbsConfig, ConfigError, ConfigLoader, LogLevel};
use abs_common::consts::DEFAULT_CONFIG_PATH;
use abs_ecu::core::EcuCore;
use abs_ecu::driver_registry::DriverRegistry;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(all(target_os = "linux", feature = "socketcan"))]
const DEFAULT_TRANSPORT: &str = "socketcan";
#[cfg(not(all(target_os = "linux", feature = "socketcan")))]
const DEFAULT_TRANSPORT: &str = "simulation";

/// ABS ECU - brake-actuation loop
#[derive(Parser, Debug)]
#[command(name = "abs_ecu")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "ABS ECU brake-actuation loop")]
#[command(long_about = None)]
struct Args {
    /// Path to configuration file (built-in defaults if missing)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// CAN transport driver
    #[arg(short, long, default_value = DEFAULT_TRANSPORT)]
    transport: String,

    /// Brake actuator driver
    #[arg(short, long, default_value = "sysfs")]
    actuator: String,

    /// Force simulation drivers for both transport and actuator
    #[arg(short = 's', long)]
    simulate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

/// Configuration as loaded, plus whether it came from disk.
struct Loaded {
    config: AbsConfig,
    from_file: bool,
}

fn main() {
    let boot = Instant::now();
    let args = Args::parse();

    let loaded = load_config(&args.config);
    let level = loaded
        .as_ref()
        .map(|l| l.config.shared.log_level)
        .unwrap_or_default();
    setup_tracing(&args, level);

    info!("ABS ECU v{} starting...", env!("CARGO_PKG_VERSION"));

    let result = match loaded {
        Ok(loaded) => run(&args, loaded, boot),
        Err(e) => Err(e.into()),
    };
    if let Err(e) = result {
        error!("FATAL: {}", e);
        process::exit(1);
    }

    info!("ABS ECU shutdown complete");
}

fn run(args: &Args, loaded: Loaded, boot: Instant) -> Result<(), Box<dyn std::error::Error>> {
    if !loaded.from_file {
        warn!(
            "Config {:?} not found, using built-in defaults",
            args.config
        );
    }
    let config = loaded.config;
    config.validate()?;
    info!("ABS ECU {}", config.summary());

    let (transport_name, actuator_name) = if args.simulate {
        info!("Simulation mode enabled");
        ("simulation", "simulation")
    } else {
        (args.transport.as_str(), args.actuator.as_str())
    };

    let registry = DriverRegistry::with_builtin();
    let transport = registry.create_transport(transport_name, &config)?;
    let actuator = registry.create_actuator(actuator_name, &config)?;
    let startup_deadline = config.timing.startup_deadline();

    let mut core = EcuCore::new(config, transport, actuator)?;
    core.start(Instant::now())?;

    let startup = boot.elapsed();
    if startup > startup_deadline {
        warn!(
            "Startup took {}ms (deadline {}ms)",
            startup.as_millis(),
            startup_deadline.as_millis()
        );
    } else {
        info!("Startup complete in {}ms", startup.as_millis());
    }

    // Setup signal handler.
    let running = core.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    let result = core.run();
    if let Err(e) = &result {
        error!("Control loop error: {}", e);
    }
    core.shutdown()?;
    result?;
    Ok(())
}

/// Load the config file; a missing file falls back to defaults.
fn load_config(path: &Path) -> Result<Loaded, ConfigError> {
    match AbsConfig::load(path) {
        Ok(config) => Ok(Loaded {
            config,
            from_file: true,
        }),
        Err(ConfigError::FileNotFound) => Ok(Loaded {
            config: AbsConfig::default(),
            from_file: false,
        }),
        Err(e) => Err(e),
    }
}

/// Setup tracing subscriber based on CLI arguments and configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        LogLevel::Debug.as_directive()
    } else {
        level.as_directive()
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

//! # TR1 Hardware Interface Binary
//!
//! Loads the hardware configuration, creates the arm driver and the
//! controller manager, and runs the update loop until interrupted.
//!
//! # Usage
//!
//! ```bash
//! # Run with the configured driver
//! tr1_hal --config config/hardware.toml
//!
//! # Force the simulation driver
//! tr1_hal --config config/hardware.toml --simulate
//!
//! # Log efforts without actuating, verbose
//! tr1_hal --config config/hardware.toml --driver dry_run -v
//!
//! # Start the shoulder PID at a different target
//! tr1_hal --config config/hardware.toml --setpoint shoulder_pan_position=0.4
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tr1_common::config::{ConfigLoader, LogLevel};
use tr1_common::consts::{DEFAULT_CONFIG_PATH, HAL_SERVICE_NAME};
use tr1_common::hal::config::HardwareConfig;
use tr1_hal::controllers::StandardControllerManager;
use tr1_hal::core::HardwareInterface;
use tr1_hal::driver_registry::DriverRegistry;
use tr1_hal::drivers::register_all_drivers;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// TR1 hardware interface - read, compute, write loop for the TR1 arm
#[derive(Parser, Debug)]
#[command(name = "tr1_hal")]
#[command(version)]
#[command(about = "TR1 arm hardware interface with pluggable drivers")]
#[command(long_about = None)]
struct Args {
    /// Path to the hardware configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Force the simulation driver
    #[arg(short = 's', long, conflicts_with = "driver")]
    simulate: bool,

    /// Driver to load, overriding the configuration file
    #[arg(short, long)]
    driver: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,

    /// Override a controller's configured setpoint (repeatable)
    #[arg(long = "setpoint", value_name = "CONTROLLER=VALUE", value_parser = parse_setpoint)]
    setpoints: Vec<(String, f64)>,

    /// Print the built-in drivers and exit
    #[arg(long)]
    list_drivers: bool,
}

fn parse_setpoint(arg: &str) -> Result<(String, f64), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected CONTROLLER=VALUE, got '{arg}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("bad setpoint value '{value}': {e}"))?;
    if !value.is_finite() {
        return Err(format!("setpoint must be finite, got {value}"));
    }
    Ok((name.trim().to_string(), value))
}

fn main() {
    if let Err(e) = run() {
        error!("Hardware interface failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut drivers = DriverRegistry::new();
    register_all_drivers(&mut drivers);
    if args.list_drivers {
        for info in drivers.drivers() {
            let feedback = if info.feedback { "feedback" } else { "no feedback" };
            println!("{:<12} {} ({})", info.name, info.summary, feedback);
        }
        return Ok(());
    }

    let config = HardwareConfig::load(&args.config);
    setup_tracing(&args, config.as_ref().ok().map(|c| c.shared.log_level));

    info!("{} v{} starting...", HAL_SERVICE_NAME, env!("CARGO_PKG_VERSION"));

    let config = config.inspect_err(|_| error!("Cannot load {}", args.config.display()))?;
    config.validate()?;
    info!(
        "Loaded {} joints and {} controllers from {}",
        config.hardware_interface.joints.len(),
        config.controllers.len(),
        args.config.display()
    );

    let driver_name = if args.simulate {
        info!("Simulation mode enabled");
        "simulation".to_string()
    } else if let Some(ref name) = args.driver {
        info!("Driver from CLI: {}", name);
        name.clone()
    } else {
        config.hardware_interface.driver.clone()
    };

    let driver = drivers.open(&driver_name, &config.hardware_interface)?;

    let controller_manager = StandardControllerManager::from_config(&config.controllers)?;
    for (name, value) in &args.setpoints {
        controller_manager.override_setpoint(name, *value)?;
        info!("Setpoint of '{}' overridden to {}", name, value);
    }

    let mut hardware = HardwareInterface::new(&config, driver, Box::new(controller_manager))?;

    let running = hardware.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    let loop_result = hardware.run();
    hardware.shutdown()?;
    loop_result?;

    info!("TR1 hardware interface shutdown complete");
    Ok(())
}

/// Setup tracing subscriber from CLI arguments and the configured level.
///
/// `--verbose` forces debug; otherwise the file's `log_level` applies.
/// `RUST_LOG` directives are honoured on top.
fn setup_tracing(args: &Args, configured: Option<LogLevel>) {
    let level = if args.verbose {
        LogLevel::Debug
    } else {
        configured.unwrap_or_default()
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

//! System-wide constants for the TR1 workspace.
//!
//! Single source of truth for defaults shared by the library and the binary.

/// Canonical service name (used for logging).
pub const HAL_SERVICE_NAME: &str = "tr1_hal";

/// Default configuration file path.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/tr1/hardware.toml";

/// Default update loop frequency in Hz.
pub const DEFAULT_LOOP_HZ: f64 = 0.1;

/// Default driver name.
pub const DEFAULT_DRIVER: &str = "simulation";

/// Convergence factor of the emulated position mode.
pub const POSITION_STEP_FACTOR: f64 = 10.0;

/// Convergence factor of the emulated velocity mode.
pub const VELOCITY_STEP_FACTOR: f64 = 10.0;

/// Default publish rate of the joint state reporter in Hz.
pub const DEFAULT_PUBLISH_RATE_HZ: f64 = 1.0;

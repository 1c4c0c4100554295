//! Prelude module for common re-exports.
//!
//! ```rust
//! use tr1_common::prelude::*;
//! ```

use std::time::Duration;

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, SharedConfig};
pub use crate::controller::{ControllerConfig, PidGainsConfig};
pub use crate::hal::config::{HardwareConfig, HardwareInterfaceConfig, SimulationConfig};

// ─── Driver Boundary ────────────────────────────────────────────────
pub use crate::hal::driver::{ArmDriver, DriverFactory, HalError};
pub use crate::hal::types::{ControlMode, JointSet, JointState};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{DEFAULT_LOOP_HZ, HAL_SERVICE_NAME};

/// Nominal update period for a loop frequency in Hz.
///
/// Yields `Duration::ZERO` for any rate without a representable period:
/// non-positive, non-finite, or so small that the period overflows
/// `Duration`. Callers treat a zero period as an invalid rate.
pub fn period_from_hz(loop_hz: f64) -> Duration {
    if !loop_hz.is_finite() || loop_hz <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(1.0 / loop_hz).unwrap_or(Duration::ZERO)
}

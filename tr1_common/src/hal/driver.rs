//! Arm driver trait and error types.
//!
//! This module defines:
//! - `ArmDriver` trait - Interface for pluggable arm drivers
//! - `HalError` enum - Error types for hardware interface operations
//! - `DriverFactory` type alias - Factory function type

use crate::config::ConfigError;
use crate::hal::config::HardwareConfig;
use crate::hal::types::JointState;
use std::time::Duration;
use thiserror::Error;

/// Error types for hardware interface operations.
#[derive(Debug, Clone, Error)]
pub enum HalError {
    /// Driver initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Hardware communication error
    #[error("Hardware communication error: {0}")]
    CommunicationError(String),

    /// Driver not found
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Controller binding or update failed
    #[error("Controller error: {0}")]
    ControllerError(String),
}

impl From<ConfigError> for HalError {
    fn from(err: ConfigError) -> Self {
        HalError::ConfigError(err.to_string())
    }
}

/// Factory function type for creating driver instances.
pub type DriverFactory = fn() -> Box<dyn ArmDriver>;

/// Trait defining the interface for arm drivers.
///
/// The hardware interface talks to the physical arm exclusively through this
/// trait, so simulation, dry-run and real actuator backends are
/// interchangeable. Joints are addressed by their index in the configured
/// joint set.
///
/// # Lifecycle
///
/// 1. `init()` - Called once before the update loop starts
/// 2. `read_joint()` - Called per joint at the start of every cycle
/// 3. `step()` then `commit()` - Called at the end of every cycle
/// 4. `shutdown()` - Called when the hardware interface is stopping
pub trait ArmDriver: Send + Sync {
    /// Returns the driver's unique identifier (e.g., "simulation").
    fn name(&self) -> &'static str;

    /// Returns the driver's semantic version.
    fn version(&self) -> &'static str;

    /// Initialize the driver with the hardware configuration.
    ///
    /// # Errors
    /// Return `HalError::InitFailed` if initialization cannot complete.
    fn init(&mut self, config: &HardwareConfig) -> Result<(), HalError>;

    /// Number of joints this driver can actuate.
    fn joint_count(&self) -> usize;

    /// Query the sensed state of one joint.
    ///
    /// Returns `Ok(None)` when the hardware offers no feedback; the caller
    /// then leaves its state slot untouched.
    fn read_joint(&mut self, _joint: usize) -> Result<Option<JointState>, HalError> {
        Ok(None)
    }

    /// Send an effort command to one joint.
    fn step(&mut self, joint: usize, effort: f64) -> Result<(), HalError>;

    /// Called once after every joint of a cycle has been stepped.
    ///
    /// `elapsed` is the actual time since the previous cycle. Default: no-op.
    fn commit(&mut self, _elapsed: Duration) -> Result<(), HalError> {
        Ok(())
    }

    /// Graceful shutdown of the driver.
    fn shutdown(&mut self) -> Result<(), HalError>;
}

//! Hardware configuration types.
//!
//! This module contains the configuration loaded from the hardware
//! configuration file:
//! - `HardwareConfig` - Whole file (shared + hardware interface + controllers)
//! - `HardwareInterfaceConfig` - Joint list, loop rate, control mode, driver
//! - `SimulationConfig` - Parameters of the simulation driver

use crate::config::{ConfigError, SharedConfig};
use crate::consts::{DEFAULT_DRIVER, DEFAULT_LOOP_HZ};
use crate::controller::ControllerConfig;
use crate::hal::types::{ControlMode, JointSet};
use crate::prelude::period_from_hz;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Default function for loop_hz
fn default_loop_hz() -> f64 {
    DEFAULT_LOOP_HZ
}

/// Default function for driver
fn default_driver() -> String {
    DEFAULT_DRIVER.to_string()
}

fn default_inertia() -> f64 {
    1.0
}

fn default_damping() -> f64 {
    0.5
}

/// Complete hardware configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareConfig {
    /// Logging and service identity.
    pub shared: SharedConfig,

    /// Adapter parameters.
    pub hardware_interface: HardwareInterfaceConfig,

    /// Simulation driver parameters (ignored by other drivers).
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Controllers loaded into the controller manager, in update order.
    #[serde(default)]
    pub controllers: Vec<ControllerConfig>,
}

/// `[hardware_interface]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareInterfaceConfig {
    /// Ordered joint names. Required; an empty list is fatal.
    #[serde(default)]
    pub joints: Vec<String>,

    /// Update loop frequency in Hz.
    /// Defaults to DEFAULT_LOOP_HZ if omitted.
    #[serde(default = "default_loop_hz")]
    pub loop_hz: f64,

    /// Command interface exposed to controllers.
    #[serde(default)]
    pub control_mode: ControlMode,

    /// Driver to load when none is given on the command line.
    #[serde(default = "default_driver")]
    pub driver: String,
}

/// `[simulation]` section.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Joint inertia [kg·m²]
    #[serde(default = "default_inertia")]
    pub inertia: f64,

    /// Viscous damping [Nm·s/rad]
    #[serde(default = "default_damping")]
    pub damping: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            inertia: default_inertia(),
            damping: default_damping(),
        }
    }
}

impl HardwareInterfaceConfig {
    /// Build the validated joint set.
    pub fn joint_set(&self) -> Result<JointSet, ConfigError> {
        JointSet::new(self.joints.clone())
    }

    /// Validate the section.
    ///
    /// # Validation Rules
    /// 1. `joints` non-empty, names non-empty and unique
    /// 2. `loop_hz` positive with a representable, non-zero period
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.joint_set()?;

        if period_from_hz(self.loop_hz).is_zero() {
            return Err(ConfigError::ValidationError(format!(
                "loop_hz must be a positive frequency, got {}",
                self.loop_hz
            )));
        }

        Ok(())
    }
}

impl HardwareConfig {
    /// Validate the whole file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.hardware_interface.validate()?;

        if !self.simulation.inertia.is_finite() || self.simulation.inertia <= 0.0 {
            return Err(ConfigError::ValidationError(
                "simulation.inertia must be positive".to_string(),
            ));
        }
        if !self.simulation.damping.is_finite() || self.simulation.damping < 0.0 {
            return Err(ConfigError::ValidationError(
                "simulation.damping cannot be negative".to_string(),
            ));
        }

        let joints = self.hardware_interface.joint_set()?;
        let mut names = HashSet::new();
        for controller in &self.controllers {
            if !names.insert(controller.name()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate controller name: {}",
                    controller.name()
                )));
            }
            controller.validate(&joints)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;

    const MINIMAL: &str = r#"
[shared]
service_name = "tr1_hal"

[hardware_interface]
joints = ["j1", "j2"]
"#;

    #[test]
    fn test_defaults_applied() {
        let config = HardwareConfig::from_toml(MINIMAL).unwrap();
        assert_eq!(config.hardware_interface.loop_hz, DEFAULT_LOOP_HZ);
        assert_eq!(config.hardware_interface.control_mode, ControlMode::Effort);
        assert_eq!(config.hardware_interface.driver, DEFAULT_DRIVER);
        assert_eq!(config.simulation, SimulationConfig::default());
        assert!(config.controllers.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_joints_fails_validation() {
        let config = HardwareConfig::from_toml(
            r#"
[shared]
service_name = "tr1_hal"

[hardware_interface]
loop_hz = 50.0
"#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_bad_loop_hz() {
        let mut config = HardwareConfig::from_toml(MINIMAL).unwrap();
        config.hardware_interface.loop_hz = 0.0;
        assert!(config.validate().is_err());
        config.hardware_interface.loop_hz = f64::NAN;
        assert!(config.validate().is_err());
        config.hardware_interface.loop_hz = 1e-30;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_duplicate_controller_names() {
        let mut config = HardwareConfig::from_toml(MINIMAL).unwrap();
        let c = ControllerConfig::EffortForward {
            name: "dup".to_string(),
            joint: "j1".to_string(),
            command: 0.0,
        };
        config.controllers = vec![c.clone(), c];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("dup"));
    }
}

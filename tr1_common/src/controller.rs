//! Controller configuration types.
//!
//! Each `[[controllers]]` table of the hardware configuration file becomes
//! one `ControllerConfig`, selected by its `type` key.
//!
//! # TOML Example
//!
//! ```toml
//! [[controllers]]
//! type = "position_pid"
//! name = "elbow"
//! joint = "right_j2"
//! setpoint = 0.5
//! gains = { kp = 20.0, kd = 1.0, out_max = 5.0 }
//! ```

use crate::config::ConfigError;
use crate::consts::DEFAULT_PUBLISH_RATE_HZ;
use crate::hal::types::JointSet;
use crate::prelude::period_from_hz;
use serde::{Deserialize, Serialize};

fn default_publish_rate() -> f64 {
    DEFAULT_PUBLISH_RATE_HZ
}

fn default_out_max() -> f64 {
    10.0
}

/// Configuration of one controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerConfig {
    /// Forward a setpoint to a joint's effort command.
    EffortForward {
        /// Controller name
        name: String,
        /// Controlled joint
        joint: String,
        /// Initial setpoint [Nm]
        #[serde(default)]
        command: f64,
    },
    /// Forward a setpoint to a joint's position command.
    PositionForward {
        /// Controller name
        name: String,
        /// Controlled joint
        joint: String,
        /// Initial setpoint [rad]
        #[serde(default)]
        command: f64,
    },
    /// Forward a setpoint to a joint's velocity command.
    VelocityForward {
        /// Controller name
        name: String,
        /// Controlled joint
        joint: String,
        /// Initial setpoint [rad/s]
        #[serde(default)]
        command: f64,
    },
    /// Track a position setpoint with a PID writing effort.
    PositionPid {
        /// Controller name
        name: String,
        /// Controlled joint
        joint: String,
        /// Initial position setpoint [rad]
        #[serde(default)]
        setpoint: f64,
        /// PID gains
        gains: PidGainsConfig,
    },
    /// Periodically sample and log every joint's state.
    JointState {
        /// Controller name
        name: String,
        /// Sampling rate [Hz]
        #[serde(default = "default_publish_rate")]
        publish_rate: f64,
    },
}

/// PID gains for `position_pid` controllers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PidGainsConfig {
    /// Proportional gain.
    pub kp: f64,
    /// Integral gain (0 = disabled).
    #[serde(default)]
    pub ki: f64,
    /// Derivative gain (0 = disabled).
    #[serde(default)]
    pub kd: f64,
    /// Derivative filter time constant [s] (0 = unfiltered).
    #[serde(default)]
    pub tf: f64,
    /// Anti-windup tracking time constant [s] (0 = disabled).
    #[serde(default)]
    pub tt: f64,
    /// Output saturation limit [Nm].
    #[serde(default = "default_out_max")]
    pub out_max: f64,
}

impl ControllerConfig {
    /// Controller name.
    pub fn name(&self) -> &str {
        match self {
            Self::EffortForward { name, .. }
            | Self::PositionForward { name, .. }
            | Self::VelocityForward { name, .. }
            | Self::PositionPid { name, .. }
            | Self::JointState { name, .. } => name,
        }
    }

    /// Joint controlled by this controller, if it claims one.
    pub fn joint(&self) -> Option<&str> {
        match self {
            Self::EffortForward { joint, .. }
            | Self::PositionForward { joint, .. }
            | Self::VelocityForward { joint, .. }
            | Self::PositionPid { joint, .. } => Some(joint),
            Self::JointState { .. } => None,
        }
    }

    /// Validate against the configured joint set.
    pub fn validate(&self, joints: &JointSet) -> Result<(), ConfigError> {
        if self.name().is_empty() {
            return Err(ConfigError::ValidationError(
                "controller name cannot be empty".to_string(),
            ));
        }

        if let Some(joint) = self.joint() {
            if joints.index_of(joint).is_none() {
                return Err(ConfigError::ValidationError(format!(
                    "Controller '{}' references unknown joint '{}'",
                    self.name(),
                    joint
                )));
            }
        }

        match self {
            Self::PositionPid { gains, .. } => gains.validate(self.name()),
            Self::JointState { publish_rate, .. } => {
                if period_from_hz(*publish_rate).is_zero() {
                    return Err(ConfigError::ValidationError(format!(
                        "Controller '{}': publish_rate must be positive",
                        self.name()
                    )));
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl PidGainsConfig {
    fn validate(&self, controller: &str) -> Result<(), ConfigError> {
        let all = [self.kp, self.ki, self.kd, self.tf, self.tt];
        if all.iter().any(|g| !g.is_finite() || *g < 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "Controller '{controller}': gains must be finite and non-negative"
            )));
        }
        if !self.out_max.is_finite() || self.out_max <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "Controller '{controller}': out_max must be positive"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Wrapper {
        controllers: Vec<ControllerConfig>,
    }

    fn joints() -> JointSet {
        JointSet::new(vec!["j1".to_string(), "j2".to_string()]).unwrap()
    }

    #[test]
    fn test_parse_tagged_controllers() {
        let w: Wrapper = toml::from_str(
            r#"
[[controllers]]
type = "effort_forward"
name = "a"
joint = "j1"
command = 0.5

[[controllers]]
type = "position_pid"
name = "b"
joint = "j2"
gains = { kp = 20.0, kd = 1.0 }

[[controllers]]
type = "joint_state"
name = "c"
"#,
        )
        .unwrap();

        assert_eq!(w.controllers.len(), 3);
        assert_eq!(
            w.controllers[0],
            ControllerConfig::EffortForward {
                name: "a".to_string(),
                joint: "j1".to_string(),
                command: 0.5,
            }
        );
        match &w.controllers[1] {
            ControllerConfig::PositionPid { setpoint, gains, .. } => {
                assert_eq!(*setpoint, 0.0);
                assert_eq!(gains.kp, 20.0);
                assert_eq!(gains.ki, 0.0);
                assert_eq!(gains.out_max, 10.0);
            }
            other => panic!("unexpected controller {other:?}"),
        }
        match &w.controllers[2] {
            ControllerConfig::JointState { publish_rate, .. } => {
                assert_eq!(*publish_rate, DEFAULT_PUBLISH_RATE_HZ)
            }
            other => panic!("unexpected controller {other:?}"),
        }
    }

    #[test]
    fn test_unknown_type_rejected() {
        let result = toml::from_str::<Wrapper>(
            r#"
[[controllers]]
type = "teleport"
name = "x"
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_unknown_joint() {
        let cfg = ControllerConfig::VelocityForward {
            name: "v".to_string(),
            joint: "j9".to_string(),
            command: 0.0,
        };
        let err = cfg.validate(&joints()).unwrap_err();
        assert!(err.to_string().contains("j9"));
    }

    #[test]
    fn test_validate_gains_and_rate() {
        let bad_gains = ControllerConfig::PositionPid {
            name: "p".to_string(),
            joint: "j1".to_string(),
            setpoint: 0.0,
            gains: PidGainsConfig {
                kp: -1.0,
                ki: 0.0,
                kd: 0.0,
                tf: 0.0,
                tt: 0.0,
                out_max: 1.0,
            },
        };
        assert!(bad_gains.validate(&joints()).is_err());

        let bad_rate = ControllerConfig::JointState {
            name: "s".to_string(),
            publish_rate: 0.0,
        };
        assert!(bad_rate.validate(&joints()).is_err());
    }

    #[test]
    fn test_unrepresentable_publish_rate_rejected() {
        let tiny = ControllerConfig::JointState {
            name: "s".to_string(),
            publish_rate: 1e-30,
        };
        assert!(matches!(
            tiny.validate(&joints()),
            Err(ConfigError::ValidationError(_))
        ));
    }
}

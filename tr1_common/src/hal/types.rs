//! Joint data types.
//!
//! This module defines the data shared across the driver boundary:
//! - `JointSet` - Ordered, validated list of joint names
//! - `JointState` - One sensed joint sample
//! - `ControlMode` - Which command the write step acts on

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Command interface selected at configuration time.
///
/// Only `Effort` drives the hardware. `Position` and `Velocity` are
/// emulated: commands converge a loopback state without actuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Ramped convergence toward a commanded position (emulated).
    Position,
    /// Ramped convergence toward a commanded velocity (emulated).
    Velocity,
    /// Direct effort pass-through to the actuators.
    #[default]
    Effort,
}

/// One joint's sensed state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct JointState {
    /// Position [rad]
    pub position: f64,
    /// Velocity [rad/s]
    pub velocity: f64,
    /// Effort [Nm]
    pub effort: f64,
}

/// Ordered joint names, fixed at initialization.
///
/// Never empty; names are non-empty and unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointSet {
    names: Vec<String>,
}

impl JointSet {
    /// Build a joint set from configured names.
    ///
    /// # Errors
    /// `ConfigError::ValidationError` if the list is empty, contains an
    /// empty name or contains duplicates.
    pub fn new(names: Vec<String>) -> Result<Self, ConfigError> {
        if names.is_empty() {
            return Err(ConfigError::ValidationError(
                "no joints found in configuration, did you load the proper config file?"
                    .to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if name.is_empty() {
                return Err(ConfigError::ValidationError(
                    "joint names cannot be empty".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::ValidationError(format!(
                    "Duplicate joint name: {name}"
                )));
            }
        }

        Ok(Self { names })
    }

    /// Number of joints (N).
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Joint name at `index`.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Index of the joint called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Iterate over names in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_control_mode_default_is_effort() {
        assert_eq!(ControlMode::default(), ControlMode::Effort);
    }

    #[test]
    fn test_joint_set_preserves_order() {
        let set = JointSet::new(names(&["j1", "j2", "j3"])).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.name(0), Some("j1"));
        assert_eq!(set.index_of("j3"), Some(2));
        assert_eq!(set.index_of("j4"), None);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["j1", "j2", "j3"]);
    }

    #[test]
    fn test_joint_set_rejects_empty_list() {
        let err = JointSet::new(Vec::new()).unwrap_err();
        assert!(err.to_string().contains("no joints"));
    }

    #[test]
    fn test_joint_set_rejects_duplicates_and_blank_names() {
        assert!(JointSet::new(names(&["j1", "j1"])).is_err());
        assert!(JointSet::new(names(&["j1", ""])).is_err());
    }
}

//! Simulation driver.
//!
//! Every joint is a damped rigid body: the commanded effort accelerates it
//! against viscous damping. Efforts latched by `step` are integrated over the
//! real cycle time on `commit` (semi-implicit Euler).

use crate::driver_registry::DriverInfo;
use std::time::Duration;
use tr1_common::hal::config::{HardwareConfig, SimulationConfig};
use tr1_common::hal::driver::{ArmDriver, HalError};
use tr1_common::hal::types::JointState;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default)]
struct SimulatedJoint {
    state: JointState,
    applied_effort: f64,
}

/// Simulation driver implementing the `ArmDriver` trait.
pub struct SimulationDriver {
    params: SimulationConfig,
    joints: Vec<SimulatedJoint>,
    names: Vec<String>,
}

impl SimulationDriver {
    /// Create an uninitialized simulation driver.
    pub fn new() -> Self {
        Self {
            params: SimulationConfig::default(),
            joints: Vec::new(),
            names: Vec::new(),
        }
    }

    fn joint_mut(&mut self, joint: usize) -> Result<&mut SimulatedJoint, HalError> {
        let count = self.joints.len();
        self.joints.get_mut(joint).ok_or_else(|| {
            HalError::CommunicationError(format!(
                "joint index {joint} out of range (driver has {count} joints)"
            ))
        })
    }
}

impl Default for SimulationDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ArmDriver for SimulationDriver {
    fn name(&self) -> &'static str {
        "simulation"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self, config: &HardwareConfig) -> Result<(), HalError> {
        let joints = &config.hardware_interface.joints;
        if config.simulation.inertia <= 0.0 {
            return Err(HalError::InitFailed(
                "simulation inertia must be positive".to_string(),
            ));
        }

        self.params = config.simulation;
        self.names = joints.clone();
        self.joints = vec![SimulatedJoint::default(); joints.len()];

        info!(
            "Simulation driver initialized with {} joints (inertia={}, damping={})",
            joints.len(),
            self.params.inertia,
            self.params.damping
        );
        Ok(())
    }

    fn joint_count(&self) -> usize {
        self.joints.len()
    }

    fn read_joint(&mut self, joint: usize) -> Result<Option<JointState>, HalError> {
        Ok(Some(self.joint_mut(joint)?.state))
    }

    fn step(&mut self, joint: usize, effort: f64) -> Result<(), HalError> {
        self.joint_mut(joint)?.applied_effort = effort;
        Ok(())
    }

    fn commit(&mut self, elapsed: Duration) -> Result<(), HalError> {
        let dt = elapsed.as_secs_f64();
        let SimulationConfig { inertia, damping } = self.params;

        for joint in &mut self.joints {
            let s = &mut joint.state;
            let accel = (joint.applied_effort - damping * s.velocity) / inertia;
            s.velocity += accel * dt;
            s.position += s.velocity * dt;
            s.effort = joint.applied_effort;
        }

        debug!("Simulation integrated {} joints over {:?}", self.joints.len(), elapsed);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        info!("Shutting down simulation driver");
        for (name, joint) in self.names.iter().zip(&self.joints) {
            debug!("  {}: final position {:.4}", name, joint.state.position);
        }
        Ok(())
    }
}

/// Registry entry of the simulation driver.
pub const INFO: DriverInfo = DriverInfo {
    name: "simulation",
    summary: "rigid joints with inertia and viscous damping, integrated per cycle",
    feedback: true,
};

/// Factory function to create a simulation driver instance.
pub fn create_driver() -> Box<dyn ArmDriver> {
    Box::new(SimulationDriver::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr1_common::config::ConfigLoader;

    fn config(inertia: f64, damping: f64) -> HardwareConfig {
        let mut config = HardwareConfig::from_toml(
            r#"
[shared]
service_name = "sim"

[hardware_interface]
joints = ["j1", "j2"]
"#,
        )
        .unwrap();
        config.simulation = SimulationConfig { inertia, damping };
        config
    }

    #[test]
    fn init_sizes_joints() {
        let mut driver = SimulationDriver::new();
        driver.init(&config(1.0, 0.0)).unwrap();
        assert_eq!(driver.joint_count(), 2);
        assert_eq!(driver.read_joint(1).unwrap(), Some(JointState::default()));
    }

    #[test]
    fn constant_effort_accelerates_joint() {
        let mut driver = SimulationDriver::new();
        driver.init(&config(2.0, 0.0)).unwrap();

        driver.step(0, 4.0).unwrap();
        driver.step(1, 0.0).unwrap();
        driver.commit(Duration::from_millis(100)).unwrap();

        let j1 = driver.read_joint(0).unwrap().unwrap();
        // a = 2 rad/s², v = 0.2 rad/s, p = 0.02 rad
        assert!((j1.velocity - 0.2).abs() < 1e-12);
        assert!((j1.position - 0.02).abs() < 1e-12);
        assert_eq!(j1.effort, 4.0);
        assert_eq!(driver.read_joint(1).unwrap().unwrap(), JointState::default());
    }

    #[test]
    fn damping_slows_free_joint() {
        let mut driver = SimulationDriver::new();
        driver.init(&config(1.0, 2.0)).unwrap();

        driver.step(0, 1.0).unwrap();
        driver.commit(Duration::from_millis(100)).unwrap();
        let v0 = driver.read_joint(0).unwrap().unwrap().velocity;

        driver.step(0, 0.0).unwrap();
        driver.commit(Duration::from_millis(100)).unwrap();
        let v1 = driver.read_joint(0).unwrap().unwrap().velocity;
        assert!(v1 < v0 && v1 > 0.0);
    }

    #[test]
    fn out_of_range_joint_is_error() {
        let mut driver = SimulationDriver::new();
        driver.init(&config(1.0, 0.5)).unwrap();
        assert!(matches!(
            driver.step(5, 1.0),
            Err(HalError::CommunicationError(_))
        ));
    }
}

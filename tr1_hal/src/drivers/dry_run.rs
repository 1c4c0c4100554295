//! Dry-run driver: logs effort writes instead of actuating.

use crate::driver_registry::DriverInfo;
use tr1_common::hal::config::HardwareConfig;
use tr1_common::hal::driver::{ArmDriver, HalError};
use tracing::{debug, info};

/// Records and logs every effort written; provides no feedback.
pub struct DryRunDriver {
    names: Vec<String>,
    last_efforts: Vec<f64>,
    writes: u64,
}

impl DryRunDriver {
    /// Create an uninitialized dry-run driver.
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            last_efforts: Vec::new(),
            writes: 0,
        }
    }

    /// Last effort written to each joint.
    pub fn last_efforts(&self) -> &[f64] {
        &self.last_efforts
    }

    /// Total number of effort writes.
    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl Default for DryRunDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ArmDriver for DryRunDriver {
    fn name(&self) -> &'static str {
        "dry_run"
    }

    fn version(&self) -> &'static str {
        env!("CARGO_PKG_VERSION")
    }

    fn init(&mut self, config: &HardwareConfig) -> Result<(), HalError> {
        self.names = config.hardware_interface.joints.clone();
        self.last_efforts = vec![0.0; self.names.len()];
        info!("Dry-run driver initialized: efforts are logged, not actuated");
        Ok(())
    }

    fn joint_count(&self) -> usize {
        self.names.len()
    }

    fn step(&mut self, joint: usize, effort: f64) -> Result<(), HalError> {
        let slot = self.last_efforts.get_mut(joint).ok_or_else(|| {
            HalError::CommunicationError(format!("joint index {joint} out of range"))
        })?;
        *slot = effort;
        self.writes += 1;
        debug!("Effort write: {} = {:.4}", self.names[joint], effort);
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), HalError> {
        info!("Dry-run driver stopped after {} effort writes", self.writes);
        Ok(())
    }
}

/// Registry entry of the dry-run driver.
pub const INFO: DriverInfo = DriverInfo {
    name: "dry_run",
    summary: "logs every effort write without actuating; no joint feedback",
    feedback: false,
};

/// Factory function to create a dry-run driver instance.
pub fn create_driver() -> Box<dyn ArmDriver> {
    Box::new(DryRunDriver::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr1_common::config::ConfigLoader;

    #[test]
    fn records_efforts_without_feedback() {
        let config = HardwareConfig::from_toml(
            r#"
[shared]
service_name = "dry"

[hardware_interface]
joints = ["j1", "j2"]
"#,
        )
        .unwrap();

        let mut driver = DryRunDriver::new();
        driver.init(&config).unwrap();
        driver.step(0, 0.5).unwrap();
        driver.step(1, -1.2).unwrap();

        assert_eq!(driver.last_efforts(), &[0.5, -1.2]);
        assert_eq!(driver.writes(), 2);
        assert_eq!(driver.read_joint(0).unwrap(), None);
        assert!(driver.step(2, 0.0).is_err());
    }
}

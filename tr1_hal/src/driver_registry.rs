//! Catalogue of arm drivers.
//!
//! Each driver registers a factory together with a [`DriverInfo`] that says
//! what it offers the hardware interface. [`DriverRegistry::open`] checks that
//! description against the configured control mode before instantiating.

use std::collections::BTreeMap;
use tr1_common::hal::config::HardwareInterfaceConfig;
use tr1_common::hal::driver::{ArmDriver, DriverFactory, HalError};
use tr1_common::hal::types::ControlMode;
use tracing::{debug, warn};

/// Static description of a driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverInfo {
    /// Name used in `hardware_interface.driver` and `--driver`.
    pub name: &'static str,
    /// One-line description for `--list-drivers`.
    pub summary: &'static str,
    /// `read_joint` reports measured joint state.
    pub feedback: bool,
}

struct Entry {
    info: DriverInfo,
    factory: DriverFactory,
}

/// Drivers available to the binary, keyed by name.
#[derive(Default)]
pub struct DriverRegistry {
    entries: BTreeMap<&'static str, Entry>,
}

impl DriverRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a driver.
    ///
    /// # Panics
    /// Two drivers with one name is a build mistake, not a runtime condition.
    pub fn register(&mut self, info: DriverInfo, factory: DriverFactory) {
        let previous = self.entries.insert(info.name, Entry { info, factory });
        assert!(previous.is_none(), "Driver '{}' is already registered", info.name);
    }

    /// Description of the driver called `name`.
    pub fn info(&self, name: &str) -> Option<&DriverInfo> {
        self.entries.get(name).map(|e| &e.info)
    }

    /// Every registered driver, ordered by name.
    pub fn drivers(&self) -> impl Iterator<Item = &DriverInfo> {
        self.entries.values().map(|e| &e.info)
    }

    /// Instantiate the driver called `name` for the configured interface.
    ///
    /// Effort mode on a driver without feedback is allowed but warned about:
    /// controllers will only ever see the initial zero state.
    ///
    /// # Errors
    /// `HalError::DriverNotFound` naming the drivers that do exist.
    pub fn open(
        &self,
        name: &str,
        hw: &HardwareInterfaceConfig,
    ) -> Result<Box<dyn ArmDriver>, HalError> {
        let entry = self.entries.get(name).ok_or_else(|| {
            let known: Vec<_> = self.entries.keys().copied().collect();
            HalError::DriverNotFound(format!("{name} (available: {})", known.join(", ")))
        })?;

        if hw.control_mode == ControlMode::Effort && !entry.info.feedback {
            warn!(
                "Driver '{}' reports no joint state; controllers will read zeros",
                name
            );
        }
        debug!("Opening driver '{}': {}", name, entry.info.summary);
        Ok((entry.factory)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr1_common::hal::config::HardwareConfig;

    struct NullArm;

    impl ArmDriver for NullArm {
        fn name(&self) -> &'static str {
            "null"
        }

        fn version(&self) -> &'static str {
            "0.0.0"
        }

        fn init(&mut self, _config: &HardwareConfig) -> Result<(), HalError> {
            Ok(())
        }

        fn joint_count(&self) -> usize {
            0
        }

        fn step(&mut self, _joint: usize, _effort: f64) -> Result<(), HalError> {
            Ok(())
        }

        fn shutdown(&mut self) -> Result<(), HalError> {
            Ok(())
        }
    }

    fn null_arm() -> Box<dyn ArmDriver> {
        Box::new(NullArm)
    }

    const NULL: DriverInfo = DriverInfo {
        name: "null",
        summary: "accepts everything",
        feedback: false,
    };

    fn hw(mode: ControlMode) -> HardwareInterfaceConfig {
        HardwareInterfaceConfig {
            joints: vec!["j1".to_string()],
            loop_hz: 10.0,
            control_mode: mode,
            driver: "null".to_string(),
        }
    }

    #[test]
    fn opens_registered_driver() {
        let mut registry = DriverRegistry::new();
        registry.register(NULL, null_arm);

        let driver = registry.open("null", &hw(ControlMode::Effort)).unwrap();
        assert_eq!(driver.name(), "null");
        assert_eq!(registry.info("null"), Some(&NULL));
    }

    #[test]
    fn unknown_driver_lists_alternatives() {
        let mut registry = DriverRegistry::new();
        registry.register(NULL, null_arm);

        match registry.open("can_bus", &hw(ControlMode::Position)) {
            Err(HalError::DriverNotFound(msg)) => {
                assert!(msg.contains("can_bus"));
                assert!(msg.contains("null"));
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("opened an unregistered driver"),
        }
    }

    #[test]
    fn drivers_listed_by_name() {
        let mut registry = DriverRegistry::new();
        registry.register(
            DriverInfo {
                name: "zeta",
                ..NULL
            },
            null_arm,
        );
        registry.register(NULL, null_arm);

        let names: Vec<_> = registry.drivers().map(|d| d.name).collect();
        assert_eq!(names, vec!["null", "zeta"]);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_registration_panics() {
        let mut registry = DriverRegistry::new();
        registry.register(NULL, null_arm);
        registry.register(NULL, null_arm);
    }
}

//! Arm driver implementations.
//!
//! - [`simulation`] - Rigid-joint physics for development without hardware
//! - [`dry_run`] - Logs every effort write, no feedback
//!
//! # Adding New Drivers
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the `ArmDriver` trait from `tr1_common::hal::driver`
//! 3. Describe it with a `DriverInfo` and register its factory in
//!    [`register_all_drivers`]

pub mod dry_run;
pub mod simulation;

use crate::driver_registry::DriverRegistry;

/// Register every built-in driver.
pub fn register_all_drivers(registry: &mut DriverRegistry) {
    registry.register(simulation::INFO, simulation::create_driver);
    registry.register(dry_run::INFO, dry_run::create_driver);
}

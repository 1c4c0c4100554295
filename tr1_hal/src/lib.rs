//! # TR1 Hardware Interface Library
//!
//! Bridges a controller manager's periodic update to the TR1 arm's actuator
//! driver. On every timer tick the [`HardwareInterface`] reads joint state
//! from the driver, lets the controller manager compute new commands, and
//! writes those commands back.
//!
//! # Module Structure
//!
//! - [`core`] - `HardwareInterface`, update cycle and loop management
//! - [`interfaces`] - Joint buffers, handles and interface registries
//! - [`controllers`] - Controller trait, manager and stock controllers
//! - [`control_law`] - Convergence laws of the emulated modes
//! - [`timer`] - Fixed-rate loop timer
//! - [`driver_registry`] - Driver factory registration
//! - [`drivers`] - Arm driver implementations
//!
//! # Architecture
//!
//! ```text
//!  ┌───────────┐  tick   ┌───────────────────┐  ctx   ┌───────────────────┐
//!  │ LoopTimer │────────►│ HardwareInterface │◄──────►│ ControllerManager │
//!  └───────────┘         │ read→update→write │        │   (trait object)  │
//!                        └─────────┬─────────┘        └───────────────────┘
//!                                  │ step / read_joint
//!                                  ▼
//!                        ┌───────────────────┐
//!                        │     ArmDriver     │ (trait object)
//!                        └───────────────────┘
//! ```

#![deny(missing_docs)]

pub mod control_law;
pub mod controllers;
pub mod core;
pub mod driver_registry;
pub mod drivers;
pub mod interfaces;
pub mod timer;

// Re-export key types for convenience
pub use crate::controllers::{ControllerManager, StandardControllerManager};
pub use crate::core::HardwareInterface;
pub use crate::driver_registry::DriverRegistry;
pub use crate::timer::{LoopTimer, TimerEvent};

//! Controller framework.
//!
//! The hardware interface sees the controller framework only through the
//! [`ControllerManager`] trait: it binds the manager to its
//! [`InterfaceRegistry`] once, then calls
//! [`ControllerManager::update`] between its read and write steps.
//!
//! [`StandardControllerManager`] is the stock implementation. It loads the
//! controllers named in the configuration file:
//!
//! | `type`             | Controller                  | Interface        |
//! |--------------------|-----------------------------|------------------|
//! | `effort_forward`   | [`ForwardCommandController`]| effort command   |
//! | `position_forward` | [`ForwardCommandController`]| position command |
//! | `velocity_forward` | [`ForwardCommandController`]| velocity command |
//! | `position_pid`     | [`PositionPidController`]   | effort command   |
//! | `joint_state`      | [`JointStateReporter`]      | joint state      |

mod forward;
mod joint_state;
mod manager;
pub mod pid;
mod position_pid;

pub use forward::ForwardCommandController;
pub use joint_state::JointStateReporter;
pub use manager::StandardControllerManager;
pub use position_pid::PositionPidController;

use crate::interfaces::{CommandKind, ControllerContext, InterfaceError, InterfaceRegistry, JointHandle};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tr1_common::controller::ControllerConfig;

/// Errors raised while loading, binding or updating controllers.
#[derive(Debug, Clone, Error)]
pub enum ControllerError {
    /// Handle lookup failed
    #[error(transparent)]
    Interface(#[from] InterfaceError),

    /// Two controllers share a name
    #[error("Controller '{0}' is already loaded")]
    DuplicateController(String),

    /// Two controllers claim the same command handle
    #[error("Joint '{joint}' {interface} is claimed by both '{first}' and '{second}'")]
    ResourceConflict {
        /// Contested joint
        joint: String,
        /// Contested interface
        interface: &'static str,
        /// Controller that claimed it first
        first: String,
        /// Controller that claimed it second
        second: String,
    },

    /// No loaded controller has that name
    #[error("No controller named '{0}'")]
    UnknownController(String),

    /// Setpoint given to a controller that has none
    #[error("Controller '{0}' has no adjustable setpoint")]
    NoSetpoint(String),

    /// Updated before being bound to an interface registry
    #[error("Controller '{0}' is not bound to the hardware interface")]
    NotBound(String),
}

/// One controller: binds joints by name, then computes commands every cycle.
///
/// # Lifecycle
///
/// 1. `init()` - Look up handles; return every command handle claimed
/// 2. `starting()` - Called once after every controller bound successfully
/// 3. `update()` - Called once per cycle, between read and write
/// 4. `stopping()` - Called when the hardware interface shuts down
pub trait Controller: Send {
    /// Unique controller name.
    fn name(&self) -> &str;

    /// Bind to the hardware interface.
    fn init(&mut self, interfaces: &InterfaceRegistry) -> Result<Vec<JointHandle>, ControllerError>;

    /// Prepare for the first update.
    fn starting(&mut self, _now: Instant) {}

    /// Compute new commands.
    fn update(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        now: Instant,
        period: Duration,
    ) -> Result<(), ControllerError>;

    /// Release after the last update.
    fn stopping(&mut self, _now: Instant) {}

    /// Externally adjustable setpoint, if the controller has one.
    fn setpoint(&self) -> Option<Setpoint> {
        None
    }
}

/// The compute step of the update cycle, as seen by the hardware interface.
pub trait ControllerManager: Send {
    /// Bind every controller to the hardware interface's registries.
    fn bind(&mut self, interfaces: &InterfaceRegistry) -> Result<(), ControllerError>;

    /// Compute new commands from the freshly read state.
    ///
    /// `period` is the real time elapsed since the previous cycle.
    fn update(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        now: Instant,
        period: Duration,
    ) -> Result<(), ControllerError>;

    /// Stop every controller. Default: no-op.
    fn shutdown(&mut self, _now: Instant) {}
}

/// Setpoint cell shared between a controller and whoever adjusts it.
///
/// Clones see each other's writes, so a handle taken from the manager keeps
/// working after the manager is moved into the hardware interface.
#[derive(Debug, Clone)]
pub struct Setpoint(Arc<AtomicU64>);

impl Setpoint {
    /// New cell holding `value`.
    pub fn new(value: f64) -> Self {
        Self(Arc::new(AtomicU64::new(value.to_bits())))
    }

    /// Current value.
    pub fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    /// Replace the value.
    pub fn set(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Build the controller described by one configuration entry.
pub fn create_controller(config: &ControllerConfig) -> Box<dyn Controller> {
    match config {
        ControllerConfig::EffortForward {
            name,
            joint,
            command,
        } => Box::new(ForwardCommandController::new(
            name,
            joint,
            CommandKind::Effort,
            *command,
        )),
        ControllerConfig::PositionForward {
            name,
            joint,
            command,
        } => Box::new(ForwardCommandController::new(
            name,
            joint,
            CommandKind::Position,
            *command,
        )),
        ControllerConfig::VelocityForward {
            name,
            joint,
            command,
        } => Box::new(ForwardCommandController::new(
            name,
            joint,
            CommandKind::Velocity,
            *command,
        )),
        ControllerConfig::PositionPid {
            name,
            joint,
            setpoint,
            gains,
        } => Box::new(PositionPidController::new(
            name,
            joint,
            *setpoint,
            (*gains).into(),
        )),
        ControllerConfig::JointState { name, publish_rate } => {
            Box::new(JointStateReporter::new(name, *publish_rate))
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::interfaces::{
        CommandKind, InterfaceRegistry, JointCommandBuffer, JointHandle, JointStateBuffer,
        JointStateHandle,
    };
    use tr1_common::hal::types::JointState;

    /// Registry with `names` on the state interface and on every command interface.
    pub fn registry(names: &[&str]) -> InterfaceRegistry {
        let mut registry = InterfaceRegistry::new();
        for (i, name) in names.iter().enumerate() {
            let state = JointStateHandle::new(*name, i);
            registry.state_mut().register_handle(state.clone()).unwrap();
            for kind in [CommandKind::Position, CommandKind::Velocity, CommandKind::Effort] {
                registry
                    .command_interface_mut(kind)
                    .register_handle(JointHandle::new(state.clone(), kind))
                    .unwrap();
            }
        }
        registry
    }

    pub fn buffers(samples: &[JointState]) -> (JointStateBuffer, JointCommandBuffer) {
        let mut state = JointStateBuffer::new(samples.len());
        for (i, s) in samples.iter().enumerate() {
            state.set(i, *s);
        }
        (state, JointCommandBuffer::new(samples.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setpoint_is_shared_between_clones() {
        let a = Setpoint::new(1.25);
        let b = a.clone();
        b.set(-3.5);
        assert_eq!(a.get(), -3.5);
    }

    #[test]
    fn create_controller_uses_configured_name() {
        let config = ControllerConfig::VelocityForward {
            name: "wrist".to_string(),
            joint: "j5".to_string(),
            command: 0.1,
        };
        let controller = create_controller(&config);
        assert_eq!(controller.name(), "wrist");
        assert_eq!(controller.setpoint().map(|s| s.get()), Some(0.1));
    }
}

//! Joint buffers, handles and interface registries.
//!
//! The hardware interface owns every buffer. Controllers never hold a
//! reference into them: they hold index-bound handles obtained by joint name
//! from an [`InterfaceRegistry`] and dereference them through the
//! [`ControllerContext`] lent to them for one compute step.
//!
//! ```text
//!   InterfaceRegistry
//!   ├── state     : JointStateInterface   ─┐ name → JointStateHandle { index }
//!   ├── position  : JointCommandInterface  │
//!   ├── velocity  : JointCommandInterface  ├ name → JointHandle { state, kind }
//!   └── effort    : JointCommandInterface ─┘
//! ```

use std::collections::HashMap;
use thiserror::Error;
use tr1_common::hal::types::{ControlMode, JointState};

/// Errors raised by handle registration and lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterfaceError {
    /// No handle with that joint name on the interface.
    #[error("Joint '{joint}' is not registered on the {interface} interface")]
    UnknownJoint {
        /// Requested joint name
        joint: String,
        /// Interface that was searched
        interface: &'static str,
    },

    /// A handle with that joint name already exists on the interface.
    #[error("Joint '{joint}' is already registered on the {interface} interface")]
    DuplicateHandle {
        /// Joint name
        joint: String,
        /// Interface that rejected the handle
        interface: &'static str,
    },
}

/// Which command slot a [`JointHandle`] writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Position command [rad]
    Position,
    /// Velocity command [rad/s]
    Velocity,
    /// Effort command [Nm]
    Effort,
}

impl CommandKind {
    /// Interface name used in logs and errors.
    pub fn interface_name(self) -> &'static str {
        match self {
            Self::Position => "position_command",
            Self::Velocity => "velocity_command",
            Self::Effort => "effort_command",
        }
    }
}

impl From<ControlMode> for CommandKind {
    fn from(mode: ControlMode) -> Self {
        match mode {
            ControlMode::Position => Self::Position,
            ControlMode::Velocity => Self::Velocity,
            ControlMode::Effort => Self::Effort,
        }
    }
}

const STATE_INTERFACE: &str = "joint_state";

// ─── Buffers ────────────────────────────────────────────────────────

/// Last sensed position, velocity and effort per joint.
///
/// Sized once; mutated only by the hardware interface's read step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointStateBuffer {
    position: Vec<f64>,
    velocity: Vec<f64>,
    effort: Vec<f64>,
}

impl JointStateBuffer {
    pub(crate) fn new(joints: usize) -> Self {
        Self {
            position: vec![0.0; joints],
            velocity: vec![0.0; joints],
            effort: vec![0.0; joints],
        }
    }

    /// Number of joints.
    pub fn len(&self) -> usize {
        self.position.len()
    }

    /// True when sized for zero joints.
    pub fn is_empty(&self) -> bool {
        self.position.is_empty()
    }

    /// Positions in joint order.
    pub fn position(&self) -> &[f64] {
        &self.position
    }

    /// Velocities in joint order.
    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// Efforts in joint order.
    pub fn effort(&self) -> &[f64] {
        &self.effort
    }

    /// Sample of one joint.
    pub fn get(&self, index: usize) -> Option<JointState> {
        Some(JointState {
            position: *self.position.get(index)?,
            velocity: *self.velocity.get(index)?,
            effort: *self.effort.get(index)?,
        })
    }

    pub(crate) fn set(&mut self, index: usize, sample: JointState) {
        self.position[index] = sample.position;
        self.velocity[index] = sample.velocity;
        self.effort[index] = sample.effort;
    }

    pub(crate) fn copy_from(&mut self, other: &JointStateBuffer) {
        self.position.copy_from_slice(&other.position);
        self.velocity.copy_from_slice(&other.velocity);
        self.effort.copy_from_slice(&other.effort);
    }
}

/// Most recently computed position, velocity and effort commands per joint.
///
/// Written by controllers through [`JointHandle`]s, consumed by the write step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JointCommandBuffer {
    position: Vec<f64>,
    velocity: Vec<f64>,
    effort: Vec<f64>,
}

impl JointCommandBuffer {
    pub(crate) fn new(joints: usize) -> Self {
        Self {
            position: vec![0.0; joints],
            velocity: vec![0.0; joints],
            effort: vec![0.0; joints],
        }
    }

    /// Number of joints.
    pub fn len(&self) -> usize {
        self.effort.len()
    }

    /// True when sized for zero joints.
    pub fn is_empty(&self) -> bool {
        self.effort.is_empty()
    }

    /// Position commands in joint order.
    pub fn position(&self) -> &[f64] {
        &self.position
    }

    /// Velocity commands in joint order.
    pub fn velocity(&self) -> &[f64] {
        &self.velocity
    }

    /// Effort commands in joint order.
    pub fn effort(&self) -> &[f64] {
        &self.effort
    }

    fn slots(&self, kind: CommandKind) -> &[f64] {
        match kind {
            CommandKind::Position => &self.position,
            CommandKind::Velocity => &self.velocity,
            CommandKind::Effort => &self.effort,
        }
    }

    fn slots_mut(&mut self, kind: CommandKind) -> &mut [f64] {
        match kind {
            CommandKind::Position => &mut self.position,
            CommandKind::Velocity => &mut self.velocity,
            CommandKind::Effort => &mut self.effort,
        }
    }

    pub(crate) fn clear(&mut self, kind: CommandKind) {
        self.slots_mut(kind).fill(0.0);
    }
}

/// Buffers lent to the controller framework for one compute step.
///
/// State is read-only; commands are writable only through handles.
pub struct ControllerContext<'a> {
    state: &'a JointStateBuffer,
    commands: &'a mut JointCommandBuffer,
}

impl<'a> ControllerContext<'a> {
    /// Borrow a state and a command buffer for one compute step.
    pub fn new(state: &'a JointStateBuffer, commands: &'a mut JointCommandBuffer) -> Self {
        Self { state, commands }
    }

    /// Sensed state.
    pub fn state(&self) -> &JointStateBuffer {
        self.state
    }

    /// Current commands.
    pub fn commands(&self) -> &JointCommandBuffer {
        self.commands
    }

    /// Commands, for writing through a [`JointHandle`].
    pub fn commands_mut(&mut self) -> &mut JointCommandBuffer {
        self.commands
    }
}

// ─── Handles ────────────────────────────────────────────────────────

/// Read access to one joint's state slots.
///
/// Handles are only minted by the hardware interface, for indices that exist
/// in its buffers; controllers obtain them by name from an
/// [`InterfaceRegistry`].
///
/// ```compile_fail
/// use tr1_hal::interfaces::JointStateHandle;
/// let _ = JointStateHandle::new("right_j1", 99);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointStateHandle {
    name: String,
    index: usize,
}

impl JointStateHandle {
    /// Bind `name` to slot `index`.
    pub(crate) fn new(name: impl Into<String>, index: usize) -> Self {
        Self {
            name: name.into(),
            index,
        }
    }

    /// Joint name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slot index in every buffer.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Sensed position.
    pub fn position(&self, state: &JointStateBuffer) -> f64 {
        state.position[self.index]
    }

    /// Sensed velocity.
    pub fn velocity(&self, state: &JointStateBuffer) -> f64 {
        state.velocity[self.index]
    }

    /// Sensed effort.
    pub fn effort(&self, state: &JointStateBuffer) -> f64 {
        state.effort[self.index]
    }
}

/// Write access to one joint's command slot, chained to its state handle.
///
/// ```compile_fail
/// use tr1_hal::interfaces::{CommandKind, JointHandle, JointStateHandle};
/// # fn forge(state: JointStateHandle) {
/// let _ = JointHandle::new(state, CommandKind::Effort);
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointHandle {
    state: JointStateHandle,
    kind: CommandKind,
}

impl JointHandle {
    /// Chain a command slot of `kind` to `state`.
    pub(crate) fn new(state: JointStateHandle, kind: CommandKind) -> Self {
        Self { state, kind }
    }

    /// Joint name.
    pub fn name(&self) -> &str {
        self.state.name()
    }

    /// Slot index in every buffer.
    pub fn index(&self) -> usize {
        self.state.index()
    }

    /// Command slot written by this handle.
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// The chained state handle.
    pub fn state(&self) -> &JointStateHandle {
        &self.state
    }

    /// Sensed position.
    pub fn position(&self, state: &JointStateBuffer) -> f64 {
        self.state.position(state)
    }

    /// Sensed velocity.
    pub fn velocity(&self, state: &JointStateBuffer) -> f64 {
        self.state.velocity(state)
    }

    /// Sensed effort.
    pub fn effort(&self, state: &JointStateBuffer) -> f64 {
        self.state.effort(state)
    }

    /// Current command.
    pub fn command(&self, commands: &JointCommandBuffer) -> f64 {
        commands.slots(self.kind)[self.index()]
    }

    /// Write a new command.
    pub fn set_command(&self, commands: &mut JointCommandBuffer, value: f64) {
        commands.slots_mut(self.kind)[self.state.index] = value;
    }
}

// ─── Interfaces ─────────────────────────────────────────────────────

/// Named, ordered collection of state handles.
#[derive(Debug, Clone, Default)]
pub struct JointStateInterface {
    handles: Vec<JointStateHandle>,
    by_name: HashMap<String, usize>,
}

impl JointStateInterface {
    /// Register a handle.
    pub fn register_handle(&mut self, handle: JointStateHandle) -> Result<(), InterfaceError> {
        if self.by_name.contains_key(handle.name()) {
            return Err(InterfaceError::DuplicateHandle {
                joint: handle.name().to_string(),
                interface: STATE_INTERFACE,
            });
        }
        self.by_name
            .insert(handle.name().to_string(), self.handles.len());
        self.handles.push(handle);
        Ok(())
    }

    /// Look up a handle by joint name.
    pub fn get_handle(&self, name: &str) -> Result<JointStateHandle, InterfaceError> {
        self.by_name
            .get(name)
            .map(|&i| self.handles[i].clone())
            .ok_or_else(|| InterfaceError::UnknownJoint {
                joint: name.to_string(),
                interface: STATE_INTERFACE,
            })
    }

    /// Registered joint names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.handles.iter().map(JointStateHandle::name).collect()
    }

    /// Registered handles in registration order.
    pub fn handles(&self) -> &[JointStateHandle] {
        &self.handles
    }

    /// Number of handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Named, ordered collection of command handles of one kind.
#[derive(Debug, Clone)]
pub struct JointCommandInterface {
    kind: CommandKind,
    handles: Vec<JointHandle>,
    by_name: HashMap<String, usize>,
}

impl JointCommandInterface {
    /// Empty interface for commands of `kind`.
    pub fn new(kind: CommandKind) -> Self {
        Self {
            kind,
            handles: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Command kind served by this interface.
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    /// Register a handle. Its kind must match the interface.
    pub fn register_handle(&mut self, handle: JointHandle) -> Result<(), InterfaceError> {
        debug_assert_eq!(handle.kind(), self.kind);
        if self.by_name.contains_key(handle.name()) {
            return Err(InterfaceError::DuplicateHandle {
                joint: handle.name().to_string(),
                interface: self.kind.interface_name(),
            });
        }
        self.by_name
            .insert(handle.name().to_string(), self.handles.len());
        self.handles.push(handle);
        Ok(())
    }

    /// Look up a handle by joint name.
    pub fn get_handle(&self, name: &str) -> Result<JointHandle, InterfaceError> {
        self.by_name
            .get(name)
            .map(|&i| self.handles[i].clone())
            .ok_or_else(|| InterfaceError::UnknownJoint {
                joint: name.to_string(),
                interface: self.kind.interface_name(),
            })
    }

    /// Registered joint names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.handles.iter().map(JointHandle::name).collect()
    }

    /// Number of handles.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// The four capability registries a hardware interface provides.
#[derive(Debug, Clone)]
pub struct InterfaceRegistry {
    state: JointStateInterface,
    position: JointCommandInterface,
    velocity: JointCommandInterface,
    effort: JointCommandInterface,
}

impl Default for InterfaceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InterfaceRegistry {
    /// Registry with four empty interfaces.
    pub fn new() -> Self {
        Self {
            state: JointStateInterface::default(),
            position: JointCommandInterface::new(CommandKind::Position),
            velocity: JointCommandInterface::new(CommandKind::Velocity),
            effort: JointCommandInterface::new(CommandKind::Effort),
        }
    }

    /// State interface.
    pub fn state(&self) -> &JointStateInterface {
        &self.state
    }

    /// Command interface of `kind`.
    pub fn command_interface(&self, kind: CommandKind) -> &JointCommandInterface {
        match kind {
            CommandKind::Position => &self.position,
            CommandKind::Velocity => &self.velocity,
            CommandKind::Effort => &self.effort,
        }
    }

    pub(crate) fn state_mut(&mut self) -> &mut JointStateInterface {
        &mut self.state
    }

    pub(crate) fn command_interface_mut(&mut self, kind: CommandKind) -> &mut JointCommandInterface {
        match kind {
            CommandKind::Position => &mut self.position,
            CommandKind::Velocity => &mut self.velocity,
            CommandKind::Effort => &mut self.effort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handles_read_and_write_their_own_slot() {
        let mut state = JointStateBuffer::new(2);
        let mut commands = JointCommandBuffer::new(2);
        state.set(
            1,
            JointState {
                position: 1.5,
                velocity: -0.2,
                effort: 3.0,
            },
        );

        let handle = JointHandle::new(JointStateHandle::new("j2", 1), CommandKind::Effort);
        assert_eq!(handle.position(&state), 1.5);
        assert_eq!(handle.velocity(&state), -0.2);
        assert_eq!(handle.effort(&state), 3.0);

        handle.set_command(&mut commands, -1.2);
        assert_eq!(handle.command(&commands), -1.2);
        assert_eq!(commands.effort(), &[0.0, -1.2]);
        assert_eq!(commands.position(), &[0.0, 0.0]);
    }

    #[test]
    fn test_state_interface_lookup_and_duplicates() {
        let mut iface = JointStateInterface::default();
        iface.register_handle(JointStateHandle::new("a", 0)).unwrap();
        iface.register_handle(JointStateHandle::new("b", 1)).unwrap();

        assert_eq!(iface.get_handle("b").unwrap().index(), 1);
        assert_eq!(iface.names(), vec!["a", "b"]);
        assert!(matches!(
            iface.get_handle("c"),
            Err(InterfaceError::UnknownJoint { .. })
        ));
        assert!(matches!(
            iface.register_handle(JointStateHandle::new("a", 2)),
            Err(InterfaceError::DuplicateHandle { .. })
        ));
    }

    #[test]
    fn test_registry_starts_with_four_empty_interfaces() {
        let registry = InterfaceRegistry::new();
        assert!(registry.state().is_empty());
        for kind in [CommandKind::Position, CommandKind::Velocity, CommandKind::Effort] {
            assert!(registry.command_interface(kind).is_empty());
            assert_eq!(registry.command_interface(kind).kind(), kind);
        }
    }

    #[test]
    fn test_unknown_joint_error_names_interface() {
        let registry = InterfaceRegistry::new();
        let err = registry
            .command_interface(CommandKind::Velocity)
            .get_handle("elbow")
            .unwrap_err();
        assert!(err.to_string().contains("elbow"));
        assert!(err.to_string().contains("velocity_command"));
    }

    #[test]
    fn test_context_lends_buffers() {
        let state = JointStateBuffer::new(1);
        let mut commands = JointCommandBuffer::new(1);
        let handle = JointHandle::new(JointStateHandle::new("j", 0), CommandKind::Position);

        let mut ctx = ControllerContext::new(&state, &mut commands);
        handle.set_command(ctx.commands_mut(), 0.75);
        assert_eq!(ctx.commands().position(), &[0.75]);
        assert_eq!(ctx.state().len(), 1);
    }
}

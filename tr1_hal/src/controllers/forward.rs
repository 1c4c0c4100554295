//! Forward command controller: copies a setpoint into one command handle.

use super::{Controller, ControllerError, Setpoint};
use crate::interfaces::{CommandKind, ControllerContext, InterfaceRegistry, JointHandle};
use std::time::{Duration, Instant};
use tracing::debug;

/// Writes its setpoint, unchanged, into a joint's position, velocity or
/// effort command every cycle.
pub struct ForwardCommandController {
    name: String,
    joint: String,
    kind: CommandKind,
    setpoint: Setpoint,
    handle: Option<JointHandle>,
}

impl ForwardCommandController {
    /// Forward `initial` to `joint`'s command of `kind` until changed.
    pub fn new(name: &str, joint: &str, kind: CommandKind, initial: f64) -> Self {
        Self {
            name: name.to_string(),
            joint: joint.to_string(),
            kind,
            setpoint: Setpoint::new(initial),
            handle: None,
        }
    }
}

impl Controller for ForwardCommandController {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, interfaces: &InterfaceRegistry) -> Result<Vec<JointHandle>, ControllerError> {
        let handle = interfaces
            .command_interface(self.kind)
            .get_handle(&self.joint)?;
        debug!(
            "Controller '{}' bound to {} of joint '{}'",
            self.name,
            self.kind.interface_name(),
            self.joint
        );
        self.handle = Some(handle.clone());
        Ok(vec![handle])
    }

    fn update(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        _now: Instant,
        _period: Duration,
    ) -> Result<(), ControllerError> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| ControllerError::NotBound(self.name.clone()))?;
        handle.set_command(ctx.commands_mut(), self.setpoint.get());
        Ok(())
    }

    fn setpoint(&self) -> Option<Setpoint> {
        Some(self.setpoint.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::test_support::{buffers, registry};
    use tr1_common::hal::types::JointState;

    #[test]
    fn forwards_setpoint_to_selected_slot() {
        let registry = registry(&["j1", "j2"]);
        let mut controller = ForwardCommandController::new("f", "j2", CommandKind::Effort, -1.2);
        let claims = controller.init(&registry).unwrap();
        assert_eq!(claims.len(), 1);
        assert_eq!(claims[0].index(), 1);

        let (state, mut commands) = buffers(&[JointState::default(); 2]);
        let mut ctx = ControllerContext::new(&state, &mut commands);
        controller
            .update(&mut ctx, Instant::now(), Duration::from_millis(20))
            .unwrap();
        assert_eq!(commands.effort(), &[0.0, -1.2]);
        assert_eq!(commands.velocity(), &[0.0, 0.0]);
    }

    #[test]
    fn setpoint_changes_take_effect_next_update() {
        let registry = registry(&["j1"]);
        let mut controller = ForwardCommandController::new("f", "j1", CommandKind::Velocity, 0.0);
        controller.init(&registry).unwrap();
        let setpoint = controller.setpoint().unwrap();

        let (state, mut commands) = buffers(&[JointState::default()]);
        setpoint.set(0.3);
        let mut ctx = ControllerContext::new(&state, &mut commands);
        controller
            .update(&mut ctx, Instant::now(), Duration::ZERO)
            .unwrap();
        assert_eq!(commands.velocity(), &[0.3]);
    }

    #[test]
    fn unbound_update_fails() {
        let mut controller = ForwardCommandController::new("f", "j1", CommandKind::Effort, 0.0);
        let (state, mut commands) = buffers(&[JointState::default()]);
        let mut ctx = ControllerContext::new(&state, &mut commands);
        let err = controller
            .update(&mut ctx, Instant::now(), Duration::ZERO)
            .unwrap_err();
        assert!(matches!(err, ControllerError::NotBound(_)));
    }

    #[test]
    fn unknown_joint_fails_init() {
        let registry = registry(&["j1"]);
        let mut controller = ForwardCommandController::new("f", "j9", CommandKind::Effort, 0.0);
        assert!(matches!(
            controller.init(&registry),
            Err(ControllerError::Interface(_))
        ));
    }
}

//! Position tracking over the effort interface.

use super::pid::{JointPid, PidGains};
use super::{Controller, ControllerError, Setpoint};
use crate::interfaces::{CommandKind, ControllerContext, InterfaceRegistry, JointHandle};
use std::time::{Duration, Instant};
use tracing::debug;

/// Drives a joint toward a position setpoint by commanding effort.
///
/// Output is clamped to `±out_max`. PID state is reset on start.
pub struct PositionPidController {
    name: String,
    joint: String,
    setpoint: Setpoint,
    pid: JointPid,
    handle: Option<JointHandle>,
}

impl PositionPidController {
    /// Track `setpoint` [rad] on `joint`.
    pub fn new(name: &str, joint: &str, setpoint: f64, gains: PidGains) -> Self {
        Self {
            name: name.to_string(),
            joint: joint.to_string(),
            setpoint: Setpoint::new(setpoint),
            pid: JointPid::new(gains),
            handle: None,
        }
    }
}

impl Controller for PositionPidController {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, interfaces: &InterfaceRegistry) -> Result<Vec<JointHandle>, ControllerError> {
        let handle = interfaces
            .command_interface(CommandKind::Effort)
            .get_handle(&self.joint)?;
        self.handle = Some(handle.clone());
        Ok(vec![handle])
    }

    fn starting(&mut self, _now: Instant) {
        self.pid.reset();
    }

    fn update(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        _now: Instant,
        period: Duration,
    ) -> Result<(), ControllerError> {
        let handle = self
            .handle
            .as_ref()
            .ok_or_else(|| ControllerError::NotBound(self.name.clone()))?;

        let target = self.setpoint.get();
        let position = handle.position(ctx.state());
        let effort = self.pid.effort(target, position, period.as_secs_f64());
        handle.set_command(ctx.commands_mut(), effort);

        debug!(
            controller = %self.name,
            target,
            position,
            effort,
            "position pid update"
        );
        Ok(())
    }

    fn setpoint(&self) -> Option<Setpoint> {
        Some(self.setpoint.clone())
    }
}

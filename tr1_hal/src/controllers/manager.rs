//! Stock controller manager.

use super::{Controller, ControllerError, ControllerManager, Setpoint, create_controller};
use crate::interfaces::{CommandKind, ControllerContext, InterfaceRegistry};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tr1_common::controller::ControllerConfig;
use tracing::info;

/// Runs a fixed list of controllers in load order.
///
/// Binding is all-or-nothing: a lookup failure or two controllers claiming
/// one command handle leaves the manager unbound.
pub struct StandardControllerManager {
    controllers: Vec<Box<dyn Controller>>,
    bound: bool,
}

impl Default for StandardControllerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardControllerManager {
    /// Manager with no controllers.
    pub fn new() -> Self {
        Self {
            controllers: Vec::new(),
            bound: false,
        }
    }

    /// Load every configured controller, in order.
    pub fn from_config(configs: &[ControllerConfig]) -> Result<Self, ControllerError> {
        let mut manager = Self::new();
        for config in configs {
            manager.load(create_controller(config))?;
        }
        Ok(manager)
    }

    /// Add a controller. Must happen before `bind`.
    pub fn load(&mut self, controller: Box<dyn Controller>) -> Result<(), ControllerError> {
        if self.controllers.iter().any(|c| c.name() == controller.name()) {
            return Err(ControllerError::DuplicateController(
                controller.name().to_string(),
            ));
        }
        self.controllers.push(controller);
        self.bound = false;
        Ok(())
    }

    /// Names of loaded controllers, in update order.
    pub fn controller_names(&self) -> Vec<&str> {
        self.controllers.iter().map(|c| c.name()).collect()
    }

    /// Setpoint cell of the controller called `name`.
    pub fn setpoint(&self, name: &str) -> Option<Setpoint> {
        self.controllers
            .iter()
            .find(|c| c.name() == name)
            .and_then(|c| c.setpoint())
    }

    /// Replace the setpoint of the controller called `name`.
    ///
    /// # Errors
    /// `UnknownController` if nothing is loaded under that name,
    /// `NoSetpoint` if the controller takes no setpoint.
    pub fn override_setpoint(&self, name: &str, value: f64) -> Result<(), ControllerError> {
        let controller = self
            .controllers
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| ControllerError::UnknownController(name.to_string()))?;
        let setpoint = controller
            .setpoint()
            .ok_or_else(|| ControllerError::NoSetpoint(name.to_string()))?;
        setpoint.set(value);
        Ok(())
    }

    /// True once `bind` has succeeded.
    pub fn is_bound(&self) -> bool {
        self.bound
    }
}

impl ControllerManager for StandardControllerManager {
    fn bind(&mut self, interfaces: &InterfaceRegistry) -> Result<(), ControllerError> {
        self.bound = false;
        let mut claims: HashMap<(CommandKind, usize), String> = HashMap::new();

        for controller in &mut self.controllers {
            for handle in controller.init(interfaces)? {
                let key = (handle.kind(), handle.index());
                if let Some(first) = claims.get(&key) {
                    return Err(ControllerError::ResourceConflict {
                        joint: handle.name().to_string(),
                        interface: handle.kind().interface_name(),
                        first: first.clone(),
                        second: controller.name().to_string(),
                    });
                }
                claims.insert(key, controller.name().to_string());
            }
        }

        let now = Instant::now();
        for controller in &mut self.controllers {
            controller.starting(now);
            info!("Started controller '{}'", controller.name());
        }

        self.bound = true;
        Ok(())
    }

    fn update(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        now: Instant,
        period: Duration,
    ) -> Result<(), ControllerError> {
        if !self.bound {
            return Err(ControllerError::NotBound("controller manager".to_string()));
        }
        for controller in &mut self.controllers {
            controller.update(ctx, now, period)?;
        }
        Ok(())
    }

    fn shutdown(&mut self, now: Instant) {
        if !self.bound {
            return;
        }
        for controller in &mut self.controllers {
            controller.stopping(now);
            info!("Stopped controller '{}'", controller.name());
        }
        self.bound = false;
    }
}

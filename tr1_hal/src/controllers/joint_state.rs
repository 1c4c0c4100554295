//! Joint state reporter.

use super::{Controller, ControllerError};
use crate::interfaces::{ControllerContext, InterfaceRegistry, JointHandle, JointStateHandle};
use std::time::{Duration, Instant};
use tr1_common::hal::types::JointState;
use tr1_common::prelude::period_from_hz;
use tracing::debug;

/// Samples every registered joint at a fixed rate and logs it.
///
/// Claims no command handle, so it can run alongside any other controller.
pub struct JointStateReporter {
    name: String,
    publish_period: Duration,
    handles: Vec<JointStateHandle>,
    snapshot: Vec<JointState>,
    last_publish: Option<Instant>,
    publish_count: u64,
}

impl JointStateReporter {
    /// Report at `publish_rate` Hz.
    pub fn new(name: &str, publish_rate: f64) -> Self {
        Self {
            name: name.to_string(),
            publish_period: period_from_hz(publish_rate),
            handles: Vec::new(),
            snapshot: Vec::new(),
            last_publish: None,
            publish_count: 0,
        }
    }

    /// Most recently published sample of every joint, in joint order.
    pub fn snapshot(&self) -> &[JointState] {
        &self.snapshot
    }

    /// Number of samples published so far.
    pub fn publish_count(&self) -> u64 {
        self.publish_count
    }
}

impl Controller for JointStateReporter {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&mut self, interfaces: &InterfaceRegistry) -> Result<Vec<JointHandle>, ControllerError> {
        self.handles = interfaces.state().handles().to_vec();
        self.snapshot = vec![JointState::default(); self.handles.len()];
        Ok(Vec::new())
    }

    fn starting(&mut self, _now: Instant) {
        self.last_publish = None;
    }

    fn update(
        &mut self,
        ctx: &mut ControllerContext<'_>,
        now: Instant,
        _period: Duration,
    ) -> Result<(), ControllerError> {
        let due = self
            .last_publish
            .is_none_or(|last| now.saturating_duration_since(last) >= self.publish_period);
        if !due {
            return Ok(());
        }

        let state = ctx.state();
        for (slot, handle) in self.snapshot.iter_mut().zip(&self.handles) {
            *slot = JointState {
                position: handle.position(state),
                velocity: handle.velocity(state),
                effort: handle.effort(state),
            };
            debug!(
                joint = handle.name(),
                position = slot.position,
                velocity = slot.velocity,
                effort = slot.effort,
                "joint state"
            );
        }

        self.last_publish = Some(now);
        self.publish_count += 1;
        Ok(())
    }
}

//! Hardware interface and update loop.
//!
//! `HardwareInterface` owns the joint buffers, exposes them to the controller
//! framework through an [`InterfaceRegistry`], and runs the periodic
//! read → compute → write cycle against an [`ArmDriver`].

use crate::control_law::{position_step, velocity_step};
use crate::controllers::ControllerManager;
use crate::interfaces::{
    CommandKind, ControllerContext, InterfaceError, InterfaceRegistry, JointCommandBuffer,
    JointHandle, JointStateBuffer, JointStateHandle,
};
use crate::timer::{LoopTimer, TimerEvent};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tr1_common::consts::{POSITION_STEP_FACTOR, VELOCITY_STEP_FACTOR};
use tr1_common::hal::config::HardwareConfig;
use tr1_common::hal::driver::{ArmDriver, HalError};
use tr1_common::hal::types::{ControlMode, JointSet};
use tr1_common::prelude::period_from_hz;
use tracing::{debug, error, info, warn};

/// Adapter between a controller manager and an arm driver.
pub struct HardwareInterface {
    /// Configured joints, in buffer order
    joints: JointSet,
    /// Command interface exposed to controllers
    control_mode: ControlMode,
    /// Configured loop frequency
    loop_hz: f64,
    /// Nominal update period
    period: Duration,
    /// Last sensed state
    state: JointStateBuffer,
    /// Last computed commands
    commands: JointCommandBuffer,
    /// Next state of the emulated modes, published by `read`
    loopback: JointStateBuffer,
    /// Handles offered to the controller framework
    interfaces: InterfaceRegistry,
    /// Arm driver
    driver: Box<dyn ArmDriver>,
    /// Controller framework
    controller_manager: Box<dyn ControllerManager>,
    /// Running flag for loop control
    running: Arc<AtomicBool>,
    /// Timing statistics
    stats: TimingStats,
}

/// Timing statistics for loop monitoring.
#[derive(Debug, Default)]
struct TimingStats {
    /// Number of cycles executed
    cycle_count: u64,
    /// Number of cycles whose body exceeded the period
    overruns: u64,
    /// Maximum observed cycle body time
    max_cycle_time_us: u64,
    /// Sum of cycle body times for average calculation
    total_cycle_time_us: u64,
}

impl HardwareInterface {
    /// Initialize buffers and handles, then bind driver and controllers.
    ///
    /// # Errors
    /// - `HalError::ConfigError` if the joint list is empty or invalid, or
    ///   `loop_hz` is not a positive rate. Nothing is allocated, registered
    ///   or initialized in that case.
    /// - `HalError::InitFailed` if the driver fails or has too few joints.
    /// - `HalError::ControllerError` if a controller cannot bind.
    pub fn new(
        config: &HardwareConfig,
        mut driver: Box<dyn ArmDriver>,
        mut controller_manager: Box<dyn ControllerManager>,
    ) -> Result<Self, HalError> {
        let hw = &config.hardware_interface;

        let joints = hw.joint_set().map_err(|e| {
            error!("Fatal: {e}");
            HalError::from(e)
        })?;
        let period = period_from_hz(hw.loop_hz);
        if period.is_zero() {
            error!("Fatal: invalid loop_hz {}", hw.loop_hz);
            return Err(HalError::ConfigError(format!(
                "loop_hz must be a positive frequency, got {}",
                hw.loop_hz
            )));
        }
        debug!("Using loop frequency of {} Hz", hw.loop_hz);

        let n = joints.len();
        let state = JointStateBuffer::new(n);
        let commands = JointCommandBuffer::new(n);
        let loopback = JointStateBuffer::new(n);
        let interfaces = register_handles(&joints, hw.control_mode)
            .map_err(|e| HalError::InitFailed(e.to_string()))?;

        driver.init(config)?;
        if driver.joint_count() < n {
            return Err(HalError::InitFailed(format!(
                "driver '{}' exposes {} joints, {} configured",
                driver.name(),
                driver.joint_count(),
                n
            )));
        }
        info!("Using driver: {} v{}", driver.name(), driver.version());

        controller_manager
            .bind(&interfaces)
            .map_err(|e| HalError::ControllerError(e.to_string()))?;

        info!(
            "Hardware interface ready: {} joints, {:?} mode, period={:?}",
            n, hw.control_mode, period
        );

        Ok(Self {
            joints,
            control_mode: hw.control_mode,
            loop_hz: hw.loop_hz,
            period,
            state,
            commands,
            loopback,
            interfaces,
            driver,
            controller_manager,
            running: Arc::new(AtomicBool::new(false)),
            stats: TimingStats::default(),
        })
    }

    /// Run one update cycle: read, compute, write.
    ///
    /// Elapsed time is the real delta between this tick and the previous one.
    /// Errors are returned unchanged; nothing is retried.
    pub fn update(&mut self, event: &TimerEvent) -> Result<(), HalError> {
        let elapsed = event.elapsed();

        self.read()?;

        let mut ctx = ControllerContext::new(&self.state, &mut self.commands);
        self.controller_manager
            .update(&mut ctx, event.current_real, elapsed)
            .map_err(|e| HalError::ControllerError(e.to_string()))?;

        self.write(elapsed)
    }

    /// Refresh the state buffers.
    ///
    /// Effort mode queries the driver per joint; a joint without feedback
    /// keeps its previous value. Emulated modes publish the loopback state.
    pub fn read(&mut self) -> Result<(), HalError> {
        match self.control_mode {
            ControlMode::Effort => {
                for i in 0..self.joints.len() {
                    if let Some(sample) = self.driver.read_joint(i)? {
                        self.state.set(i, sample);
                    }
                }
            }
            ControlMode::Position | ControlMode::Velocity => {
                self.state.copy_from(&self.loopback);
            }
        }
        Ok(())
    }

    /// Send the current commands.
    ///
    /// Effort mode steps every joint once, in index order, with its effort
    /// command, whether or not it changed, then commits the cycle.
    pub fn write(&mut self, elapsed: Duration) -> Result<(), HalError> {
        match self.control_mode {
            ControlMode::Effort => {
                for (i, &effort) in self.commands.effort().iter().enumerate() {
                    self.driver.step(i, effort)?;
                }
                self.driver.commit(elapsed)?;
            }
            ControlMode::Position => {
                for i in 0..self.joints.len() {
                    let Some(mut next) = self.state.get(i) else {
                        continue;
                    };
                    next.position = position_step(
                        next.position,
                        self.commands.position()[i],
                        POSITION_STEP_FACTOR,
                        self.loop_hz,
                    );
                    self.loopback.set(i, next);
                }
            }
            ControlMode::Velocity => {
                for i in 0..self.joints.len() {
                    let Some(mut next) = self.state.get(i) else {
                        continue;
                    };
                    (next.position, next.velocity) = velocity_step(
                        next.position,
                        next.velocity,
                        self.commands.velocity()[i],
                        elapsed,
                        VELOCITY_STEP_FACTOR,
                        self.loop_hz,
                    );
                    self.loopback.set(i, next);
                }
            }
        }
        Ok(())
    }

    /// Run the update loop until the running flag clears or a cycle fails.
    ///
    /// # Errors
    /// Returns the first error raised by a cycle.
    pub fn run(&mut self) -> Result<(), HalError> {
        let mut timer = LoopTimer::new(self.loop_hz)?;

        info!(
            "Starting update loop (period={:?}, {} joints)...",
            self.period,
            self.joints.len()
        );
        self.running.store(true, Ordering::SeqCst);

        if detect_rt_mode() {
            info!("Running in real-time mode");
        } else {
            info!("Running in standard (non-RT) mode");
        }

        let period_us = self.period.as_micros() as u64;
        let running = Arc::clone(&self.running);

        while let Some(event) = timer.wait(&running) {
            let cycle_start = Instant::now();

            if let Err(e) = self.update(&event) {
                error!("Update cycle {} failed: {}", self.stats.cycle_count + 1, e);
                self.running.store(false, Ordering::SeqCst);
                return Err(e);
            }

            let cycle_time_us = cycle_start.elapsed().as_micros() as u64;
            self.stats.cycle_count += 1;
            self.stats.total_cycle_time_us += cycle_time_us;
            if cycle_time_us > self.stats.max_cycle_time_us {
                self.stats.max_cycle_time_us = cycle_time_us;
            }

            if cycle_time_us > period_us {
                self.stats.overruns += 1;
                if self.stats.overruns <= 10 || self.stats.overruns % 1000 == 0 {
                    warn!(
                        "Overrun #{}: cycle took {}us (period {}us)",
                        self.stats.overruns, cycle_time_us, period_us
                    );
                }
            }

            if self.stats.cycle_count % 1000 == 0 {
                debug!(
                    "Update loop: {} cycles, avg={}us, max={}us, overruns={}, missed ticks={}",
                    self.stats.cycle_count,
                    self.stats.total_cycle_time_us / self.stats.cycle_count,
                    self.stats.max_cycle_time_us,
                    self.stats.overruns,
                    timer.missed_ticks()
                );
            }
        }

        info!(
            "Update loop stopped after {} cycles (overruns: {}, missed ticks: {})",
            self.stats.cycle_count,
            self.stats.overruns,
            timer.missed_ticks()
        );
        Ok(())
    }

    /// Stop controllers, zero the actuators and shut the driver down.
    pub fn shutdown(&mut self) -> Result<(), HalError> {
        info!("Shutdown requested");
        self.running.store(false, Ordering::SeqCst);

        self.controller_manager.shutdown(Instant::now());

        self.commands.clear(CommandKind::Effort);
        if self.control_mode == ControlMode::Effort {
            for i in 0..self.joints.len() {
                self.driver.step(i, 0.0)?;
            }
            self.driver.commit(Duration::ZERO)?;
        }

        self.driver.shutdown()
    }

    /// Get the running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Configured joints.
    pub fn joints(&self) -> &JointSet {
        &self.joints
    }

    /// Selected control mode.
    pub fn control_mode(&self) -> ControlMode {
        self.control_mode
    }

    /// Nominal update period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Last sensed state.
    pub fn state(&self) -> &JointStateBuffer {
        &self.state
    }

    /// Last computed commands.
    pub fn commands(&self) -> &JointCommandBuffer {
        &self.commands
    }

    /// Registered handles.
    pub fn interfaces(&self) -> &InterfaceRegistry {
        &self.interfaces
    }

    /// Get timing statistics: (cycles, overruns, max cycle time in us).
    pub fn stats(&self) -> (u64, u64, u64) {
        (
            self.stats.cycle_count,
            self.stats.overruns,
            self.stats.max_cycle_time_us,
        )
    }
}

/// Register a state handle per joint and a command handle of the selected
/// mode chained to it.
fn register_handles(joints: &JointSet, mode: ControlMode) -> Result<InterfaceRegistry, InterfaceError> {
    let kind = CommandKind::from(mode);
    let mut registry = InterfaceRegistry::new();

    for (i, name) in joints.iter().enumerate() {
        debug!("Loading joint name: {}", name);
        let state = JointStateHandle::new(name, i);
        registry.state_mut().register_handle(state.clone())?;
        registry
            .command_interface_mut(kind)
            .register_handle(JointHandle::new(state, kind))?;
    }

    Ok(registry)
}

/// Detect if running in real-time mode by checking scheduler policy.
fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        use libc::{SCHED_FIFO, SCHED_RR, sched_getscheduler};
        // SAFETY: sched_getscheduler(0) only queries the calling thread's policy.
        unsafe {
            let policy = sched_getscheduler(0);
            policy == SCHED_FIFO || policy == SCHED_RR
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}

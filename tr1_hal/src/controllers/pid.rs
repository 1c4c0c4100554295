//! Joint position PID producing a saturated effort.
//!
//! The derivative acts on the measured joint position, not on the error, so a
//! setpoint override does not produce an effort spike. With `tf > 0` the
//! measured rate is low-pass filtered. Integral windup is limited by
//! back-calculation when `tt > 0` and by clamping the integral to `±out_max`
//! otherwise.

use tr1_common::controller::PidGainsConfig;

/// PID gains.
#[derive(Debug, Clone, Copy)]
pub struct PidGains {
    /// Proportional gain [Nm/rad].
    pub kp: f64,
    /// Integral gain [Nm/(rad·s)], 0 disables.
    pub ki: f64,
    /// Derivative gain [Nm·s/rad], 0 disables.
    pub kd: f64,
    /// Rate filter time constant [s], 0 disables.
    pub tf: f64,
    /// Anti-windup tracking time constant [s], 0 selects integral clamping.
    pub tt: f64,
    /// Effort limit [Nm].
    pub out_max: f64,
}

impl From<PidGainsConfig> for PidGains {
    fn from(cfg: PidGainsConfig) -> Self {
        Self {
            kp: cfg.kp,
            ki: cfg.ki,
            kd: cfg.kd,
            tf: cfg.tf,
            tt: cfg.tt,
            out_max: cfg.out_max,
        }
    }
}

/// PID law for one joint, with the history it needs between cycles.
#[derive(Debug, Clone)]
pub struct JointPid {
    gains: PidGains,
    integral: f64,
    last_position: Option<f64>,
    rate: f64,
    /// Saturated minus unsaturated effort of the last cycle.
    excess: f64,
}

impl JointPid {
    /// Fresh law with no history.
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            integral: 0.0,
            last_position: None,
            rate: 0.0,
            excess: 0.0,
        }
    }

    /// Gains in use.
    pub fn gains(&self) -> &PidGains {
        &self.gains
    }

    /// Forget integral and rate history.
    pub fn reset(&mut self) {
        *self = Self::new(self.gains);
    }

    /// Effort [Nm] driving a joint at `position` toward `target` over a cycle
    /// of `dt` seconds, clamped to `±out_max`.
    ///
    /// A non-positive `dt` leaves the history untouched and commands nothing.
    pub fn effort(&mut self, target: f64, position: f64, dt: f64) -> f64 {
        if dt <= 0.0 {
            return 0.0;
        }
        let g = self.gains;
        let error = target - position;

        // First cycle has no previous sample: treat the joint as at rest.
        let measured_rate = self
            .last_position
            .map_or(0.0, |last| (position - last) / dt);
        self.last_position = Some(position);
        self.rate = if g.tf > 0.0 {
            self.rate + dt / (g.tf + dt) * (measured_rate - self.rate)
        } else {
            measured_rate
        };

        if g.ki > 0.0 {
            let tracking = if g.tt > 0.0 { self.excess / g.tt } else { 0.0 };
            self.integral += (g.ki * error + tracking) * dt;
            if g.tt <= 0.0 {
                self.integral = self.integral.clamp(-g.out_max, g.out_max);
            }
        } else {
            self.integral = 0.0;
        }

        let raw = g.kp * error + self.integral - g.kd * self.rate;
        let effort = raw.clamp(-g.out_max, g.out_max);
        self.excess = effort - raw;
        effort
    }
}

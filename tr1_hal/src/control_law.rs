//! Ramped convergence laws for the emulated position and velocity modes.
//!
//! Each cycle closes a fixed fraction of the remaining error. The fraction is
//! `factor / loop_hz`, so the time to converge does not depend on the loop
//! rate. The fraction is capped at 1: a slow loop reaches the setpoint in one
//! cycle rather than overshooting it.

use std::time::Duration;

/// Fraction of the error closed per cycle.
#[inline]
pub fn step_gain(factor: f64, loop_hz: f64) -> f64 {
    (factor / loop_hz).clamp(0.0, 1.0)
}

/// Next position of a joint converging on `command`.
#[inline]
pub fn position_step(position: f64, command: f64, factor: f64, loop_hz: f64) -> f64 {
    let error = command - position;
    position + error * step_gain(factor, loop_hz)
}

/// Next (position, velocity) of a joint converging on a velocity `command`.
///
/// Position integrates the current velocity over the real elapsed time.
#[inline]
pub fn velocity_step(
    position: f64,
    velocity: f64,
    command: f64,
    elapsed: Duration,
    factor: f64,
    loop_hz: f64,
) -> (f64, f64) {
    let next_position = position + velocity * elapsed.as_secs_f64();
    let error = command - velocity;
    (next_position, velocity + error * step_gain(factor, loop_hz))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn gain_is_rate_invariant_and_capped() {
        assert!((step_gain(10.0, 100.0) - 0.1).abs() < EPS);
        assert!((step_gain(10.0, 1000.0) - 0.01).abs() < EPS);
        assert_eq!(step_gain(10.0, 0.1), 1.0);
    }

    #[test]
    fn position_closes_fraction_of_error() {
        let next = position_step(0.0, 1.0, 10.0, 100.0);
        assert!((next - 0.1).abs() < EPS);

        let mut p = 0.0;
        for _ in 0..200 {
            p = position_step(p, 1.0, 10.0, 100.0);
        }
        assert!((p - 1.0).abs() < 1e-6);
    }

    #[test]
    fn slow_loop_lands_on_setpoint() {
        assert_eq!(position_step(-2.0, 3.0, 10.0, 0.1), 3.0);
    }

    #[test]
    fn velocity_integrates_position_with_real_elapsed() {
        let (p, v) = velocity_step(1.0, 2.0, 4.0, Duration::from_millis(20), 10.0, 100.0);
        assert!((p - 1.04).abs() < EPS);
        assert!((v - 2.2).abs() < EPS);
    }
}

//! Periodic loop timer.
//!
//! Ticks at a fixed nominal period on the monotonic clock. Each tick reports
//! the real instants of this and the previous tick so the update cycle sees
//! actual elapsed time, jitter included.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tr1_common::hal::driver::HalError;
use tr1_common::prelude::period_from_hz;

/// Longest single sleep, so a cleared running flag is seen promptly even at
/// very low loop rates.
const MAX_SLEEP_SLICE: Duration = Duration::from_millis(50);

/// One timer tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    /// When this tick actually fired.
    pub current_real: Instant,
    /// When the previous tick actually fired (timer start for the first tick).
    pub last_real: Instant,
    /// When this tick was scheduled to fire.
    pub current_expected: Instant,
}

impl TimerEvent {
    /// Real time between the previous tick and this one.
    pub fn elapsed(&self) -> Duration {
        self.current_real.saturating_duration_since(self.last_real)
    }

    /// How late this tick fired relative to its schedule.
    pub fn latency(&self) -> Duration {
        self.current_real
            .saturating_duration_since(self.current_expected)
    }
}

/// Fixed-rate timer driving the update loop.
#[derive(Debug)]
pub struct LoopTimer {
    period: Duration,
    next_expected: Instant,
    last_real: Instant,
    missed_ticks: u64,
}

impl LoopTimer {
    /// Create a timer ticking at `loop_hz`, first tick one period from now.
    ///
    /// # Errors
    /// `HalError::ConfigError` if `loop_hz` is not a positive, finite rate.
    pub fn new(loop_hz: f64) -> Result<Self, HalError> {
        Self::starting_at(loop_hz, Instant::now())
    }

    fn starting_at(loop_hz: f64, start: Instant) -> Result<Self, HalError> {
        let period = period_from_hz(loop_hz);
        if period.is_zero() {
            return Err(HalError::ConfigError(format!(
                "loop_hz must be a positive frequency, got {loop_hz}"
            )));
        }

        Ok(Self {
            period,
            next_expected: start + period,
            last_real: start,
            missed_ticks: 0,
        })
    }

    /// Nominal period.
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Ticks skipped because the loop fell more than a period behind.
    pub fn missed_ticks(&self) -> u64 {
        self.missed_ticks
    }

    /// Block until the next tick.
    ///
    /// Returns `None` as soon as `running` is cleared.
    pub fn wait(&mut self, running: &AtomicBool) -> Option<TimerEvent> {
        loop {
            if !running.load(Ordering::SeqCst) {
                return None;
            }
            let now = Instant::now();
            if now >= self.next_expected {
                return Some(self.fire(now));
            }
            std::thread::sleep((self.next_expected - now).min(MAX_SLEEP_SLICE));
        }
    }

    fn fire(&mut self, now: Instant) -> TimerEvent {
        let event = TimerEvent {
            current_real: now,
            last_real: self.last_real,
            current_expected: self.next_expected,
        };

        self.last_real = now;
        self.next_expected += self.period;

        // More than a whole period late: drop the backlog and re-anchor.
        if now > self.next_expected {
            let behind = now - self.next_expected;
            self.missed_ticks += (behind.as_nanos() / self.period.as_nanos()) as u64 + 1;
            self.next_expected = now + self.period;
        }

        event
    }
}

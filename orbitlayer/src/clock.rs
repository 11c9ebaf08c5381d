//! Simulation clock.
//!
//! Simulated time advances by the wall-clock time between ticks multiplied by
//! the time scale, and stands still while paused.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

/// Default speed-up over real time.
pub const DEFAULT_TIME_SCALE: f64 = 60.0;

/// Scaled, pausable simulation time.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    now: DateTime<Utc>,
    time_scale: f64,
    paused: bool,
}

impl SimulationClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: start,
            time_scale: DEFAULT_TIME_SCALE,
            paused: false,
        }
    }

    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.set_time_scale(time_scale);
        self
    }

    /// Current simulated instant.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Set the speed-up. Non-finite or negative values are ignored.
    pub fn set_time_scale(&mut self, time_scale: f64) {
        if time_scale.is_finite() && time_scale >= 0.0 {
            self.time_scale = time_scale;
        } else {
            debug!(time_scale, "Ignoring invalid time scale");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip between paused and running; returns the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Jump to `instant` without changing scale or pause state.
    pub fn reset(&mut self, instant: DateTime<Utc>) {
        debug!(%instant, "Simulation clock reset");
        self.now = instant;
    }

    /// Advance by `wall_elapsed × time_scale` unless paused.
    pub fn advance(&mut self, wall_elapsed: Duration) -> DateTime<Utc> {
        if self.paused {
            return self.now;
        }

        let micros = wall_elapsed.as_secs_f64() * self.time_scale * 1e6;
        if !micros.is_finite() || micros >= i64::MAX as f64 {
            return self.now;
        }
        let delta = TimeDelta::microseconds(micros.round() as i64);
        if let Some(next) = self.now.checked_add_signed(delta) {
            self.now = next;
        }
        self.now
    }
}

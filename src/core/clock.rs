//! Simulation clock
//!
//! Tracks elapsed simulated time and the tick counter. Hosts deliver ticks at
//! irregular intervals (first frame after load, backgrounded tabs), so every
//! step is clamped to `max_step` before it reaches the simulation.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::core::types::Tick;

#[derive(Debug, Clone)]
pub struct Clock {
    period: Duration,
    max_step: Duration,
    elapsed: Duration,
    ticks: Tick,
}

impl Clock {
    pub fn new(period: Duration, max_step: Duration) -> Self {
        Self {
            period,
            max_step: max_step.max(period),
            elapsed: Duration::ZERO,
            ticks: 0,
        }
    }

    /// Nominal period between ticks
    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn max_step(&self) -> Duration {
        self.max_step
    }

    /// Advance by `dt`, returning the clamped step actually applied
    pub fn advance(&mut self, dt: Duration) -> Duration {
        let step = dt.min(self.max_step);
        self.elapsed += step;
        self.ticks += 1;
        step
    }

    /// Total simulated time since the session started
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn ticks(&self) -> Tick {
        self.ticks
    }
}

/// Wall-clock time in Unix milliseconds, used for `lastSave` stamps
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

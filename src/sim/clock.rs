//! Time sources
//!
//! The engine never reads the wall clock itself; a [`Clock`] supplies one
//! reading per frame and entities diff against their own last reading with
//! a [`FrameTimer`].

use std::time::Instant;

/// Supplies monotonically non-decreasing time in milliseconds
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Monotonic wall clock, starting at zero on construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// Hand-advanced clock for headless runs and tests
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: f64,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self { now: start_ms }
    }

    pub fn advance(&mut self, ms: f64) {
        self.now += ms.max(0.0);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now
    }
}

/// Per-entity elapsed time tracking
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTimer {
    last: Option<f64>,
}

impl FrameTimer {
    /// Milliseconds since the previous call. The first call yields zero so a
    /// freshly spawned entity does not jump by the whole simulation time.
    pub fn delta(&mut self, time: f64) -> f32 {
        let delta = match self.last {
            Some(last) => (time - last).max(0.0),
            None => 0.0,
        };
        self.last = Some(time);
        delta as f32
    }
}

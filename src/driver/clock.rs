use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Time source for the frame driver, in seconds.
pub trait Clock {
    /// Seconds since an arbitrary fixed epoch.
    fn now(&self) -> f64;

    /// Block for roughly `secs` seconds.
    fn sleep(&self, secs: f64);
}

/// Wall clock backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    /// Clock whose epoch is now.
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
    fn now(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn sleep(&self, secs: f64) {
        if secs > 0.0 {
            std::thread::sleep(Duration::from_secs_f64(secs));
        }
    }
}

/// Deterministic clock for tests and offline rendering; `sleep` advances time.
///
/// Clones share the same time, so a test can keep a handle while the driver owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
    slept: Rc<Cell<f64>>,
}

impl ManualClock {
    /// Clock starting at `start` seconds.
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
            slept: Rc::new(Cell::new(0.0)),
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, t: f64) {
        self.now.set(t);
    }

    /// Move time forward.
    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt);
    }

    /// Total seconds spent in [`Clock::sleep`].
    pub fn total_slept(&self) -> f64 {
        self.slept.get()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }

    fn sleep(&self, secs: f64) {
        if secs > 0.0 {
            self.advance(secs);
            self.slept.set(self.slept.get() + secs);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/clock.rs"]
mod tests;

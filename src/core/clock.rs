//! Monotonic time source injected into the engine
//!
//! The engine never samples wall-clock time itself. Hosts hand it a
//! [`Clock`]; tests and the headless runner use [`ManualClock`] so time
//! only moves when they say so.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::ops::Add;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Point on a monotonic timeline, measured from the clock's origin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(Duration);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(Duration::ZERO);

    pub fn from_secs_f32(secs: f32) -> Self {
        Self::from_millis((secs.max(0.0) * 1000.0).round() as u64)
    }

    pub fn from_millis(millis: u64) -> Self {
        Self(Duration::from_millis(millis))
    }

    /// Time elapsed since `earlier`, saturating at zero
    pub fn since(self, earlier: Timestamp) -> Duration {
        self.0.saturating_sub(earlier.0)
    }

    /// Earlier point, clamped at the origin
    pub fn saturating_sub(self, by: Duration) -> Timestamp {
        Timestamp(self.0.saturating_sub(by))
    }

    pub fn as_secs_f32(&self) -> f32 {
        self.0.as_secs_f32()
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(rhs))
    }
}

/// Source of monotonic timestamps
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Real monotonic clock backed by [`Instant`]
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.origin.elapsed())
    }
}

/// Hand-driven clock. Clones share the same timeline.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    pub fn advance_secs(&self, secs: f32) {
        self.advance_millis((secs.max(0.0) * 1000.0).round() as u64);
    }

    /// Jump to an absolute time; never moves backwards
    pub fn set(&self, to: Timestamp) {
        if to.0 > self.now.get() {
            self.now.set(to.0);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.get())
    }
}

//! Monotonic time sources for the control loop

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use super::types::Timestamp;

/// Monotonic time source
///
/// The loop never reads wall-clock time directly; everything that needs
/// "now" goes through this trait so a test can script time.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Clock backed by `Instant`, measuring from the moment it was created
///
/// Clones share the same base, so a frame source and the loop holding
/// separate clones agree on timestamps.
#[derive(Clone)]
pub struct MonotonicClock {
    base: Arc<Instant>,
}

impl MonotonicClock {
    /// Create a new clock starting now
    pub fn new() -> Self {
        Self {
            base: Arc::new(Instant::now()),
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_duration(self.base.elapsed())
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MonotonicClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonotonicClock")
            .field("elapsed", &self.base.elapsed())
            .finish()
    }
}

/// Hand-driven clock for replaying scripted sequences
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    micros: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute time; never moves backwards
    pub fn set(&self, at: Timestamp) {
        self.micros.fetch_max(at.micros, Ordering::Relaxed);
    }

    pub fn advance(&self, by: Duration) {
        self.micros
            .fetch_add(by.as_micros() as i64, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_micros(self.micros.load(Ordering::Relaxed))
    }
}

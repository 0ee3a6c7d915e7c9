//! Time sources for the profiler
//!
//! The tracker never calls `Instant::now()` itself; it asks a [`Clock`].
//! Production code uses [`MonotonicClock`]. Tests and scenario replay use
//! [`ManualClock`], which only moves when told to, so attributed times are
//! exact.

use std::cell::Cell;
use std::time::Instant;

use crate::domain::{Duration, Timestamp};

/// A monotonic time source.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time relative to the moment the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    #[must_use]
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
        let elapsed: Duration = self.origin.elapsed().into();
        Timestamp(elapsed.0)
    }
}

/// A clock that stands still until advanced.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by.0));
    }

    pub fn advance_ms(&self, ms: u64) {
        self.advance(Duration::from_millis(ms));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_only_moves_when_advanced() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Timestamp(0));
        clock.advance_ms(3);
        assert_eq!(clock.now(), Timestamp(3_000_000));
        assert_eq!(clock.now(), Timestamp(3_000_000));
    }

    #[test]
    fn test_monotonic_clock_never_goes_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}

//! Domain types providing compile-time safety and self-documentation
//!
//! Timestamps and durations are kept as integer nanoseconds so that nested
//! subtraction stays exact; conversion to floating-point milliseconds only
//! happens when a report is built.

// Unit conversions intentionally convert u64 to f64
#![allow(clippy::cast_precision_loss)]

use std::fmt;
use std::ops::{Add, AddAssign};

/// Timestamp in nanoseconds
///
/// A point on the profiler's monotonic clock. The origin is whatever the
/// clock chose (see [`crate::clock`]); only differences are meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    #[must_use]
    pub fn duration_since(self, earlier: Timestamp) -> Duration {
        Duration(self.0.saturating_sub(earlier.0))
    }

    /// Convert to seconds (f64)
    #[must_use]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    /// Convert to microseconds (f64)
    #[must_use]
    pub fn as_micros(self) -> f64 {
        self.0 as f64 / 1_000.0
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.as_seconds())
    }
}

/// Duration in nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(pub u64);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    #[must_use]
    pub fn from_millis(ms: u64) -> Self {
        Duration(ms.saturating_mul(1_000_000))
    }

    #[must_use]
    pub fn from_micros(us: u64) -> Self {
        Duration(us.saturating_mul(1_000))
    }

    #[must_use]
    pub fn saturating_sub(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_sub(rhs.0))
    }

    /// Convert to milliseconds (f64)
    #[must_use]
    pub fn as_millis(self) -> f64 {
        self.0 as f64 / 1_000_000.0
    }

    /// Convert to seconds (f64)
    #[must_use]
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1_000_000_000.0
    }

    /// Convert to microseconds (f64)
    #[must_use]
    pub fn as_micros(self) -> f64 {
        self.0 as f64 / 1_000.0
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl From<std::time::Duration> for Duration {
    fn from(d: std::time::Duration) -> Self {
        Duration(u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ms = self.as_millis();
        if ms >= 1000.0 {
            write!(f, "{:.2}s", self.as_seconds())
        } else {
            write!(f, "{ms:.2}ms")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_since_saturates() {
        assert_eq!(Timestamp(5_000).duration_since(Timestamp(2_000)), Duration(3_000));
        assert_eq!(Timestamp(1_000).duration_since(Timestamp(2_000)), Duration::ZERO);
    }

    #[test]
    fn test_duration_conversions() {
        let dur = Duration::from_millis(5);
        assert_eq!(dur.as_millis(), 5.0);
        assert_eq!(dur.as_seconds(), 0.005);
        assert_eq!(dur.as_micros(), 5_000.0);
    }

    #[test]
    fn test_duration_display() {
        assert_eq!(Duration(5_000_000).to_string(), "5.00ms");
        assert_eq!(Duration(1_500_000_000).to_string(), "1.50s");
    }

    #[test]
    fn test_timestamp_advance() {
        let ts = Timestamp(1_000) + Duration::from_micros(2);
        assert_eq!(ts, Timestamp(3_000));
        assert_eq!(ts.as_micros(), 3.0);
    }
}

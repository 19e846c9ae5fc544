//! Time types for the relaytree protocol.
//!
//! All time values are passed explicitly into handlers rather than read from
//! a platform clock, which keeps every state transition replayable under a
//! discrete-event harness.

use core::ops::{Add, AddAssign, Sub};

/// Point in simulated time, in milliseconds since the start of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Timestamp(ms)
    }

    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(1000))
    }

    #[inline]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn as_secs(self) -> u64 {
        self.0 / 1000
    }

    /// Saturating difference, clamped to zero when `other` is later.
    #[inline]
    pub const fn saturating_sub(self, other: Timestamp) -> Duration {
        Duration(self.0.saturating_sub(other.0))
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn add(self, rhs: Duration) -> Timestamp {
        Timestamp(self.0 + rhs.0)
    }
}

impl AddAssign<Duration> for Timestamp {
    #[inline]
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Timestamp) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

/// Span of time in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(u64);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    #[inline]
    pub const fn from_millis(ms: u64) -> Self {
        Duration(ms)
    }

    #[inline]
    pub const fn from_secs(secs: u64) -> Self {
        Duration(secs.saturating_mul(1000))
    }

    #[inline]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn as_secs(self) -> u64 {
        self.0 / 1000
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn saturating_mul(self, n: u64) -> Self {
        Duration(self.0.saturating_mul(n))
    }
}

impl Add for Duration {
    type Output = Duration;

    #[inline]
    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl Sub for Duration {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Duration) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let t = Timestamp::from_millis(2500);
        assert_eq!(t.as_millis(), 2500);
        assert_eq!(t.as_secs(), 2);

        let d = Duration::from_secs(3);
        assert_eq!(d.as_millis(), 3000);
        assert!(!d.is_zero());
        assert!(Duration::ZERO.is_zero());
    }

    #[test]
    fn test_arithmetic() {
        let t = Timestamp::from_secs(10) + Duration::from_secs(5);
        assert_eq!(t.as_secs(), 15);

        let diff = Timestamp::from_secs(20) - Timestamp::from_secs(15);
        assert_eq!(diff.as_secs(), 5);

        let sum = Duration::from_millis(700) + Duration::from_millis(400);
        assert_eq!(sum.as_millis(), 1100);
    }

    #[test]
    fn test_saturating() {
        let early = Timestamp::from_secs(1);
        let late = Timestamp::from_secs(2);
        assert_eq!(early.saturating_sub(late), Duration::ZERO);
        assert_eq!(late.saturating_sub(early), Duration::from_secs(1));
    }

    #[test]
    fn test_ordering() {
        assert!(Timestamp::from_millis(999) < Timestamp::from_secs(1));
        assert!(Duration::from_secs(1) > Duration::from_millis(999));
    }
}

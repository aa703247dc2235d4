//! Logical simulation time.
//!
//! [`Duration`] is a signed count of logical microseconds. It measures
//! elapsed simulated time, not wall-clock time; the simulation engine is
//! the only source of advancement.

use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// A span of logical simulation time, in microseconds.
///
/// Durations are signed: subtracting a longer duration from a shorter
/// one yields a negative span, which expiry arithmetic interprets as
/// "already expired."
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Duration(i64);

impl Duration {
    /// The zero-length span.
    pub const ZERO: Duration = Duration(0);

    /// The smallest representable positive span (one microsecond).
    pub const EPSILON: Duration = Duration(1);

    /// One microsecond.
    pub const MICROSECOND: Duration = Duration(1);

    /// One millisecond.
    pub const MILLISECOND: Duration = Duration(1_000);

    /// One second.
    pub const SECOND: Duration = Duration(1_000_000);

    /// One minute.
    pub const MINUTE: Duration = Duration(60 * 1_000_000);

    /// One hour.
    pub const HOUR: Duration = Duration(3_600 * 1_000_000);

    /// The longest representable span.
    pub const MAX: Duration = Duration(i64::MAX);

    /// The shortest (most negative) representable span.
    pub const MIN: Duration = Duration(i64::MIN);

    /// Construct a duration from a raw microsecond count.
    pub const fn from_micros(micros: i64) -> Self {
        Duration(micros)
    }

    /// Construct a duration from a whole number of seconds, saturating
    /// at [`Duration::MAX`]/[`Duration::MIN`].
    pub const fn from_secs(secs: i64) -> Self {
        Duration(secs.saturating_mul(1_000_000))
    }

    /// `count` multiples of `unit`, e.g. `Duration::of(30, Duration::SECOND)`.
    /// Saturates at [`Duration::MAX`]/[`Duration::MIN`].
    pub const fn of(count: i64, unit: Duration) -> Self {
        Duration(count.saturating_mul(unit.0))
    }

    /// The raw microsecond count.
    pub const fn as_micros(self) -> i64 {
        self.0
    }

    /// The exact ratio of this duration over another, as a float.
    ///
    /// Used to evaluate continuous dynamics: polynomial stepping divides
    /// elapsed time by [`Duration::SECOND`].
    pub fn ratio_over(self, unit: Duration) -> f64 {
        self.0 as f64 / unit.0 as f64
    }

    /// True if this span is negative.
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    /// The smaller of two durations.
    pub fn min(self, other: Duration) -> Duration {
        if self <= other {
            self
        } else {
            other
        }
    }

    /// The larger of two durations.
    pub fn max(self, other: Duration) -> Duration {
        if self >= other {
            self
        } else {
            other
        }
    }

    /// Saturating addition, pinning at [`Duration::MAX`]/[`Duration::MIN`].
    pub const fn saturating_add(self, other: Duration) -> Duration {
        Duration(self.0.saturating_add(other.0))
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0 + rhs.0)
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        self.0 += rhs.0;
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Duration {
        Duration(self.0 - rhs.0)
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Duration) {
        self.0 -= rhs.0;
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Duration {
        Duration(self.0 * rhs)
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Duration {
        Duration(-self.0)
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "+" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:06}s", abs / 1_000_000, abs % 1_000_000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_and_ordering() {
        assert_eq!(Duration::SECOND - Duration::MILLISECOND * 1000, Duration::ZERO);
        assert!(Duration::ZERO < Duration::EPSILON);
        assert!((Duration::ZERO - Duration::SECOND).is_negative());
        assert_eq!(Duration::of(2, Duration::MINUTE), Duration::from_secs(120));
    }

    #[test]
    fn constructors_saturate_instead_of_overflowing() {
        assert_eq!(Duration::from_secs(i64::MAX), Duration::MAX);
        assert_eq!(Duration::from_secs(i64::MIN), Duration::MIN);
        assert_eq!(Duration::of(2, Duration::MAX), Duration::MAX);
        assert_eq!(Duration::of(-2, Duration::MAX), Duration::MIN);
    }

    #[test]
    fn ratio_over_second() {
        assert_eq!(Duration::from_secs(3).ratio_over(Duration::SECOND), 3.0);
        assert_eq!(Duration::MILLISECOND.ratio_over(Duration::SECOND), 1e-3);
    }

    #[test]
    fn display_includes_sign_and_micros() {
        assert_eq!(Duration::from_micros(1_500_000).to_string(), "+1.500000s");
        assert_eq!(Duration::from_micros(-250).to_string(), "-0.000250s");
    }
}

//! Validity horizons for computed values.

use crate::time::Duration;
use std::cmp::Ordering;
use std::fmt;

/// The logical instant, measured from the moment of computation, at
/// which a value becomes stale.
///
/// `Expiry::NEVER` means the value remains valid forever; it sorts after
/// every finite expiry. Combination with [`Expiry::or`] takes the
/// earlier horizon, so a derived value never outlives its sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Expiry(Option<Duration>);

impl Expiry {
    /// A value that never goes stale.
    pub const NEVER: Expiry = Expiry(None);

    /// Expiry at `t` from now.
    pub const fn at(t: Duration) -> Self {
        Expiry(Some(t))
    }

    /// The remaining validity, or `None` for never.
    pub const fn value(self) -> Option<Duration> {
        self.0
    }

    /// True if this expiry is [`Expiry::NEVER`].
    pub const fn is_never(self) -> bool {
        self.0.is_none()
    }

    /// The earlier of two horizons.
    ///
    /// This is the combination rule for derivations: a value computed
    /// from several sources expires when the first source does.
    pub fn or(self, other: Expiry) -> Expiry {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Expiry(Some(a.min(b))),
            (Some(a), None) => Expiry(Some(a)),
            (None, b) => Expiry(b),
        }
    }

    /// Shorten the remaining validity by `elapsed`.
    ///
    /// A negative result means "already expired"; callers must recompute
    /// before trusting the associated value.
    pub fn minus(self, elapsed: Duration) -> Expiry {
        Expiry(self.0.map(|t| t - elapsed))
    }

    /// Strictly earlier than `other`.
    pub fn shorter_than(self, other: Expiry) -> bool {
        self < other
    }

    /// Earlier than or equal to `other`.
    pub fn no_longer_than(self, other: Expiry) -> bool {
        self <= other
    }

    /// Strictly later than `other`.
    pub fn longer_than(self, other: Expiry) -> bool {
        self > other
    }

    /// Later than or equal to `other`.
    pub fn no_shorter_than(self, other: Expiry) -> bool {
        self >= other
    }
}

impl Ord for Expiry {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(a), Some(b)) => a.cmp(&b),
        }
    }
}

impl PartialOrd for Expiry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(t) => write!(f, "expires at {t}"),
            None => write!(f, "never expires"),
        }
    }
}

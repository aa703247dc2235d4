//! Time-advanceable value types.

use crate::error::ErrorCatching;
use crate::expiring::Expiring;
use crate::time::Duration;
use std::fmt;

/// A self-typed value that can be advanced through simulated time.
///
/// # Contract
///
/// - `step` MUST be deterministic and compose:
///   `d.step(a).step(b) == d.step(a + b)`.
/// - `extract` observes the value at the current instant without
///   advancing anything.
/// - `are_equal_results` is the equivalence used when checking whether
///   concurrent effects commute. The receiver is the pre-effect
///   baseline, which lets dynamics with a canonical form (or a fuzzy
///   tolerance anchored at the original value) override the default
///   structural equality.
pub trait Dynamics: Clone + fmt::Debug + PartialEq + 'static {
    /// The observable value this dynamics extracts.
    type Value;

    /// The value at the current instant.
    fn extract(&self) -> Self::Value;

    /// This dynamics advanced by `elapsed`.
    fn step(&self, elapsed: Duration) -> Self;

    /// Whether two post-effect results are equivalent, judged from this
    /// pre-effect baseline. Defaults to structural equality.
    fn are_equal_results(&self, left: &Self, right: &Self) -> bool {
        let _ = self;
        left == right
    }
}

/// Equivalence of two full cell states, judged from a common baseline.
///
/// Successes compare under [`Dynamics::are_equal_results`]; failures
/// compare by error equivalence (same variant and payload); mixed
/// outcomes never match. Used by the auto effect trait's commutativity
/// check.
pub fn are_equal_results<D: Dynamics>(
    original: &ErrorCatching<Expiring<D>>,
    left: &ErrorCatching<Expiring<D>>,
    right: &ErrorCatching<Expiring<D>>,
) -> bool {
    match (left, right) {
        (ErrorCatching::Success(l), ErrorCatching::Success(r)) => {
            let baseline = match original {
                ErrorCatching::Success(o) => &o.data,
                // No usable baseline; fall back to the left result.
                ErrorCatching::Failure(_) => &l.data,
            };
            baseline.are_equal_results(&l.data, &r.data)
        }
        (ErrorCatching::Failure(l), ErrorCatching::Failure(r)) => l == r,
        _ => false,
    }
}

/// A value that is constant over time.
///
/// The simplest dynamics: stepping is the identity, extraction returns
/// the stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Discrete<V>(pub V);

impl<V> Discrete<V> {
    /// Wrap a value as constant-in-time dynamics.
    pub fn new(value: V) -> Self {
        Discrete(value)
    }
}

impl<V: Clone + fmt::Debug + PartialEq + 'static> Dynamics for Discrete<V> {
    type Value = V;

    fn extract(&self) -> V {
        self.0.clone()
    }

    fn step(&self, _elapsed: Duration) -> Self {
        self.clone()
    }
}

/// A running clock: extracts the duration elapsed since its start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clock {
    /// Time shown by the clock at the current instant.
    pub time: Duration,
}

impl Clock {
    /// A clock reading `start` at the current instant.
    pub fn starting_at(start: Duration) -> Self {
        Clock { time: start }
    }
}

impl Dynamics for Clock {
    type Value = Duration;

    fn extract(&self) -> Duration {
        self.time
    }

    fn step(&self, elapsed: Duration) -> Self {
        Clock {
            time: self.time + elapsed,
        }
    }
}

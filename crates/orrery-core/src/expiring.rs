//! A value paired with its validity horizon.

use crate::expiry::Expiry;
use crate::time::Duration;
use std::fmt;

/// A computed value together with the [`Expiry`] after which it must be
/// recomputed before being trusted.
///
/// The monadic combinators here enforce the expiry min-law: a derived
/// value's expiry is the [`Expiry::or`] of every source expiry, so a
/// derivation can never outlive its shortest-lived input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Expiring<D> {
    /// The computed value.
    pub data: D,
    /// When `data` goes stale, measured from its computation.
    pub expiry: Expiry,
}

impl<D> Expiring<D> {
    /// Pair `data` with an explicit expiry.
    pub fn new(data: D, expiry: Expiry) -> Self {
        Expiring { data, expiry }
    }

    /// Pair `data` with a finite horizon `t` from now.
    pub fn expiring_at(data: D, t: Duration) -> Self {
        Expiring::new(data, Expiry::at(t))
    }

    /// A value that never goes stale. This is the monadic unit.
    pub fn never(data: D) -> Self {
        Expiring::new(data, Expiry::NEVER)
    }

    /// Transform the value, keeping this expiry.
    pub fn map<B>(self, f: impl FnOnce(D) -> B) -> Expiring<B> {
        Expiring::new(f(self.data), self.expiry)
    }

    /// Monadic bind: the result's expiry is the earlier of this expiry
    /// and the one produced by `f`.
    pub fn bind<B>(self, f: impl FnOnce(D) -> Expiring<B>) -> Expiring<B> {
        let b = f(self.data);
        Expiring::new(b.data, self.expiry.or(b.expiry))
    }

    /// Borrowing accessor for the value.
    pub fn data(&self) -> &D {
        &self.data
    }

    /// The validity horizon.
    pub fn expiry(&self) -> Expiry {
        self.expiry
    }
}

/// Combine two expiring values; the result expires when the earlier input does.
pub fn map2<A, B, C>(a: Expiring<A>, b: Expiring<B>, f: impl FnOnce(A, B) -> C) -> Expiring<C> {
    Expiring::new(f(a.data, b.data), a.expiry.or(b.expiry))
}

impl<D: fmt::Display> fmt::Display for Expiring<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.data, self.expiry)
    }
}

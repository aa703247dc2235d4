//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies the scheduled task emitting an effect.
///
/// Task ids are issued by the external cooperative scheduler. Two
/// effects emitted under the same `TaskId` at one instant are in
/// program order and combine sequentially; effects under distinct ids
/// at the same instant are concurrent and combine through the cell's
/// effect trait.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TaskId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Counter for unique [`SourceId`] allocation.
static SOURCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique, stable identity for a resource or cell.
///
/// Allocated from a monotonic atomic counter via [`SourceId::next`].
/// Introspection tables (naming, telemetry) key on these explicit ids
/// rather than object identity; the owning table controls entry
/// lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    /// Allocate a fresh, unique id. Thread-safe.
    pub fn next() -> Self {
        Self(SOURCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_ids_are_unique() {
        let a = SourceId::next();
        let b = SourceId::next();
        assert_ne!(a, b);
    }
}

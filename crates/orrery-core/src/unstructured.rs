//! Dynamics with no observable structure.
//!
//! Unstructured dynamics wrap opaque functions of time, or arbitrary
//! mappings over other dynamics. They are fully general but cannot be
//! reported out or solved against; structured dynamics (discrete,
//! polynomial) should be preferred where they fit.
//!
//! Closures have no value equality in Rust, so equivalence for the
//! commutativity check falls back to `Rc` pointer identity on the
//! mapping function plus recursive equivalence of the operands.

use crate::dynamics::Dynamics;
use crate::time::Duration;
use std::any::Any;
use std::fmt;
use std::rc::Rc;

/// An opaque, time-advanceable value.
pub enum Unstructured<V: 'static> {
    /// A direct function of elapsed time since creation.
    TimeBased {
        /// The value at each elapsed offset.
        value_over_time: Rc<dyn Fn(Duration) -> V>,
        /// Time already elapsed since creation.
        elapsed: Duration,
    },
    /// A unary- or binary-mapped view over other dynamics, held through
    /// an erased operand so the source dynamics types do not leak into
    /// this signature.
    Derived(Rc<dyn ErasedDynamics<V>>),
}

impl<V> Unstructured<V> {
    /// Dynamics computed directly from elapsed time.
    pub fn time_based(value_over_time: impl Fn(Duration) -> V + 'static) -> Self {
        Unstructured::TimeBased {
            value_over_time: Rc::new(value_over_time),
            elapsed: Duration::ZERO,
        }
    }

    /// Map an arbitrary function over another dynamics.
    pub fn map<D: Dynamics>(source: D, f: impl Fn(&D::Value) -> V + 'static) -> Self {
        Unstructured::Derived(Rc::new(MappedOp {
            source,
            f: Rc::new(f),
        }))
    }

    /// Combine two dynamics through an arbitrary function.
    pub fn map2<A: Dynamics, B: Dynamics>(
        a: A,
        b: B,
        f: impl Fn(&A::Value, &B::Value) -> V + 'static,
    ) -> Self {
        Unstructured::Derived(Rc::new(ZippedOp {
            a,
            b,
            f: Rc::new(f),
        }))
    }
}

impl<V> Clone for Unstructured<V> {
    fn clone(&self) -> Self {
        match self {
            Self::TimeBased {
                value_over_time,
                elapsed,
            } => Self::TimeBased {
                value_over_time: Rc::clone(value_over_time),
                elapsed: *elapsed,
            },
            Self::Derived(op) => Self::Derived(Rc::clone(op)),
        }
    }
}

impl<V> fmt::Debug for Unstructured<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TimeBased { elapsed, .. } => {
                f.debug_struct("TimeBased").field("elapsed", elapsed).finish()
            }
            Self::Derived(_) => f.debug_struct("Derived").finish(),
        }
    }
}

impl<V> PartialEq for Unstructured<V> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::TimeBased {
                    value_over_time: fa,
                    elapsed: ea,
                },
                Self::TimeBased {
                    value_over_time: fb,
                    elapsed: eb,
                },
            ) => Rc::ptr_eq(fa, fb) && ea == eb,
            (Self::Derived(a), Self::Derived(b)) => a.equals(b.as_ref()),
            _ => false,
        }
    }
}

impl<V: 'static> Dynamics for Unstructured<V> {
    type Value = V;

    fn extract(&self) -> V {
        match self {
            Self::TimeBased {
                value_over_time,
                elapsed,
            } => value_over_time(*elapsed),
            Self::Derived(op) => op.extract(),
        }
    }

    fn step(&self, t: Duration) -> Self {
        match self {
            Self::TimeBased {
                value_over_time,
                elapsed,
            } => Self::TimeBased {
                value_over_time: Rc::clone(value_over_time),
                elapsed: *elapsed + t,
            },
            Self::Derived(op) => Self::Derived(op.step(t)),
        }
    }

    fn are_equal_results(&self, left: &Self, right: &Self) -> bool {
        match (self, left, right) {
            (Self::Derived(baseline), Self::Derived(l), Self::Derived(r)) => {
                baseline.results_equal(l.as_ref(), r.as_ref())
            }
            // Time-based results are equal when they are the same
            // function at the same offset.
            _ => left == right,
        }
    }
}

/// Object-safe view of a mapped dynamics operand.
///
/// Implementations carry the concrete source dynamics by value;
/// equivalence downcasts the other side to the same concrete type.
pub trait ErasedDynamics<V> {
    /// The mapped value at the current instant.
    fn extract(&self) -> V;

    /// This operand advanced by `elapsed`.
    fn step(&self, elapsed: Duration) -> Rc<dyn ErasedDynamics<V>>;

    /// Structural identity: same mapping function, equal sources.
    fn equals(&self, other: &dyn ErasedDynamics<V>) -> bool;

    /// Result equivalence for the commutativity check, judged from this
    /// operand as the pre-effect baseline.
    fn results_equal(&self, left: &dyn ErasedDynamics<V>, right: &dyn ErasedDynamics<V>) -> bool;

    /// Downcasting support for [`ErasedDynamics::equals`].
    fn as_any(&self) -> &dyn Any;
}

struct MappedOp<D: Dynamics, V> {
    source: D,
    f: Rc<dyn Fn(&D::Value) -> V>,
}

impl<D: Dynamics, V: 'static> ErasedDynamics<V> for MappedOp<D, V> {
    fn extract(&self) -> V {
        (self.f)(&self.source.extract())
    }

    fn step(&self, elapsed: Duration) -> Rc<dyn ErasedDynamics<V>> {
        Rc::new(MappedOp {
            source: self.source.step(elapsed),
            f: Rc::clone(&self.f),
        })
    }

    fn equals(&self, other: &dyn ErasedDynamics<V>) -> bool {
        match other.as_any().downcast_ref::<MappedOp<D, V>>() {
            Some(o) => Rc::ptr_eq(&self.f, &o.f) && self.source == o.source,
            None => false,
        }
    }

    fn results_equal(&self, left: &dyn ErasedDynamics<V>, right: &dyn ErasedDynamics<V>) -> bool {
        match (
            left.as_any().downcast_ref::<MappedOp<D, V>>(),
            right.as_any().downcast_ref::<MappedOp<D, V>>(),
        ) {
            (Some(l), Some(r)) => {
                Rc::ptr_eq(&l.f, &r.f)
                    && self.source.are_equal_results(&l.source, &r.source)
            }
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct ZippedOp<A: Dynamics, B: Dynamics, V> {
    a: A,
    b: B,
    f: Rc<dyn Fn(&A::Value, &B::Value) -> V>,
}

impl<A: Dynamics, B: Dynamics, V: 'static> ErasedDynamics<V> for ZippedOp<A, B, V> {
    fn extract(&self) -> V {
        (self.f)(&self.a.extract(), &self.b.extract())
    }

    fn step(&self, elapsed: Duration) -> Rc<dyn ErasedDynamics<V>> {
        Rc::new(ZippedOp {
            a: self.a.step(elapsed),
            b: self.b.step(elapsed),
            f: Rc::clone(&self.f),
        })
    }

    fn equals(&self, other: &dyn ErasedDynamics<V>) -> bool {
        match other.as_any().downcast_ref::<ZippedOp<A, B, V>>() {
            Some(o) => Rc::ptr_eq(&self.f, &o.f) && self.a == o.a && self.b == o.b,
            None => false,
        }
    }

    fn results_equal(&self, left: &dyn ErasedDynamics<V>, right: &dyn ErasedDynamics<V>) -> bool {
        match (
            left.as_any().downcast_ref::<ZippedOp<A, B, V>>(),
            right.as_any().downcast_ref::<ZippedOp<A, B, V>>(),
        ) {
            (Some(l), Some(r)) => {
                Rc::ptr_eq(&l.f, &r.f)
                    && self.a.are_equal_results(&l.a, &r.a)
                    && self.b.are_equal_results(&l.b, &r.b)
            }
            _ => false,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

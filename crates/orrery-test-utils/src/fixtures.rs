//! Reusable dynamics, resources, and effects for tests.

use orrery_cell::DynamicsEffect;
use orrery_core::{Discrete, Duration, Dynamics, ErrorCatching, Expiring, SimError};
use orrery_resource::{from_fn, ResourceRef};

/// Dynamics with a constant rate of change per second.
///
/// The simplest dynamics whose value actually evolves with time, which
/// makes it the fixture of choice for stepping and re-stepping tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ramp {
    pub value: f64,
    pub rate: f64,
}

impl Ramp {
    pub fn new(value: f64, rate: f64) -> Self {
        Ramp { value, rate }
    }
}

impl Dynamics for Ramp {
    type Value = f64;

    fn extract(&self) -> f64 {
        self.value
    }

    fn step(&self, elapsed: Duration) -> Self {
        Ramp {
            value: self.value + self.rate * elapsed.ratio_over(Duration::SECOND),
            rate: self.rate,
        }
    }
}

/// A resource that always reports `dynamics` expiring `at` from now.
pub fn expiring_resource<D: Dynamics>(dynamics: D, at: Duration) -> ResourceRef<D> {
    from_fn(move || ErrorCatching::Success(Expiring::expiring_at(dynamics.clone(), at)))
}

/// A resource that always reports a derivation failure.
pub fn failing_resource<D: Dynamics>(reason: &str) -> ResourceRef<D> {
    let error = SimError::derivation(reason);
    from_fn(move || ErrorCatching::Failure(error.clone()))
}

/// An effect adding `amount` to a discrete counter. Effects built this
/// way commute with each other.
pub fn add(amount: i64) -> DynamicsEffect<Discrete<i64>> {
    DynamicsEffect::of(format!("add {amount}"), move |Discrete(n)| {
        Discrete(n + amount)
    })
}

/// An effect that fails with a derivation error, leaving the cell
/// failing until a later effect overwrites it.
pub fn fail(reason: &str) -> DynamicsEffect<Discrete<i64>> {
    let error = SimError::derivation(reason);
    DynamicsEffect::fallible(format!("fail: {reason}"), move |_| Err(error.clone()))
}

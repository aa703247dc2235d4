//! The read-only resource capability.

use orrery_core::{Dynamics, ErrorCatching, Expiring, SimError};
use std::rc::Rc;

/// A read-only capability over time-varying state.
///
/// Stateless and pull-based: every call to `get_dynamics` may recompute
/// from sources, which keeps derived state always current at some
/// evaluation cost. Wrap with [`crate::CachedResource`] when
/// recomputation is expensive.
pub trait Resource<D: Dynamics> {
    /// The current dynamics, with failure and expiry information.
    fn get_dynamics(&self) -> ErrorCatching<Expiring<D>>;
}

/// A shared handle to a resource.
///
/// The simulation runs on a single logical thread, so handles are `Rc`,
/// not atomics or locks.
pub type ResourceRef<D> = Rc<dyn Resource<D>>;

struct FnResource<F>(F);

impl<D, F> Resource<D> for FnResource<F>
where
    D: Dynamics,
    F: Fn() -> ErrorCatching<Expiring<D>>,
{
    fn get_dynamics(&self) -> ErrorCatching<Expiring<D>> {
        (self.0)()
    }
}

/// A resource computed by a closure on every read.
pub fn from_fn<D: Dynamics>(
    f: impl Fn() -> ErrorCatching<Expiring<D>> + 'static,
) -> ResourceRef<D> {
    Rc::new(FnResource(f))
}

/// A resource holding `dynamics` forever.
pub fn constant<D: Dynamics>(dynamics: D) -> ResourceRef<D> {
    from_fn(move || ErrorCatching::Success(Expiring::never(dynamics.clone())))
}

/// The resource's current dynamics value, surfacing any stored failure.
pub fn current_data<D: Dynamics>(resource: &ResourceRef<D>) -> Result<D, SimError> {
    resource.get_dynamics().map(|e| e.data).into_result()
}

/// The resource's current extracted value, surfacing any stored failure.
pub fn current_value<D: Dynamics>(resource: &ResourceRef<D>) -> Result<D::Value, SimError> {
    current_data(resource).map(|d| d.extract())
}

/// The current extracted value, or `fallback` if the resource is failing.
pub fn value_or<D: Dynamics>(resource: &ResourceRef<D>, fallback: D::Value) -> D::Value {
    current_value(resource).unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::Discrete;

    #[test]
    fn constant_never_expires() {
        let r = constant(Discrete::new(7));
        let state = r.get_dynamics().into_result().unwrap();
        assert!(state.expiry.is_never());
        assert_eq!(current_value(&r).unwrap(), 7);
    }

    #[test]
    fn value_or_falls_back_on_failure() {
        let r: ResourceRef<Discrete<i32>> =
            from_fn(|| ErrorCatching::Failure(SimError::derivation("unavailable")));
        assert_eq!(value_or(&r, -1), -1);
    }
}

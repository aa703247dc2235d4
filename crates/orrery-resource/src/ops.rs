//! Monadic combinators for building derived resources.
//!
//! All combinators recompute on every read, propagate the first failing
//! input untouched, and bound the result's expiry by the `or` (min) of
//! every source expiry.

use crate::resource::{from_fn, ResourceRef};
use orrery_core::error;
use orrery_core::expiring;
use orrery_core::{Dynamics, ErrorCatching, Expiring, SimError};

/// Derive a resource by a pure function of one source.
pub fn map<A, B>(a: &ResourceRef<A>, f: impl Fn(&A) -> B + 'static) -> ResourceRef<B>
where
    A: Dynamics,
    B: Dynamics,
{
    let a = a.clone();
    from_fn(move || a.get_dynamics().map(|ea| ea.map(|d| f(&d))))
}

/// Derive a resource by a pure function of two sources.
///
/// The result fails if either input fails (first failure wins), and
/// expires when the first input does.
pub fn map2<A, B, C>(
    a: &ResourceRef<A>,
    b: &ResourceRef<B>,
    f: impl Fn(&A, &B) -> C + 'static,
) -> ResourceRef<C>
where
    A: Dynamics,
    B: Dynamics,
    C: Dynamics,
{
    let (a, b) = (a.clone(), b.clone());
    from_fn(move || {
        error::map2(a.get_dynamics(), b.get_dynamics(), |ea, eb| {
            expiring::map2(ea, eb, |da, db| f(&da, &db))
        })
    })
}

/// Derive a resource whose definition depends on a source's value.
///
/// The result's expiry is bounded by both the source's expiry and the
/// inner resource's expiry.
pub fn bind<A, B>(
    a: &ResourceRef<A>,
    f: impl Fn(&A) -> ResourceRef<B> + 'static,
) -> ResourceRef<B>
where
    A: Dynamics,
    B: Dynamics,
{
    let a = a.clone();
    from_fn(move || {
        a.get_dynamics().and_then(|ea| {
            f(&ea.data)
                .get_dynamics()
                .map(|eb| Expiring::new(eb.data, ea.expiry.or(eb.expiry)))
        })
    })
}

/// Derive a resource by a function that may report a modeling error.
///
/// An `Err` becomes a [`ErrorCatching::Failure`] on the derived
/// resource only; it clears as soon as the inputs recover and the
/// function succeeds again.
pub fn try_map<A, B>(
    a: &ResourceRef<A>,
    f: impl Fn(&A) -> Result<B, SimError> + 'static,
) -> ResourceRef<B>
where
    A: Dynamics,
    B: Dynamics,
{
    let a = a.clone();
    from_fn(move || {
        a.get_dynamics()
            .and_then(|ea| f(&ea.data).map(|b| Expiring::new(b, ea.expiry)).into())
    })
}

/// Erase expiry information from a resource.
///
/// Useful when a resource is defined through a feedback loop, to keep
/// the expiry from propagating across iterations of that loop.
pub fn erase_expiry<D: Dynamics>(a: &ResourceRef<D>) -> ResourceRef<D> {
    let a = a.clone();
    from_fn(move || a.get_dynamics().map(|e| Expiring::never(e.data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_resource::ResourceCell;
    use crate::resource::{constant, current_value};
    use orrery_cell::DynamicsEffect;
    use orrery_core::{Discrete, Duration, Expiry, TaskId};
    use proptest::prelude::*;

    #[test]
    fn map2_combines_values() {
        let a = constant(Discrete::new(2));
        let b = constant(Discrete::new(40));
        let sum = map2(&a, &b, |Discrete(x), Discrete(y)| Discrete::new(x + y));
        assert_eq!(current_value(&sum).unwrap(), 42);
    }

    #[test]
    fn derived_expiry_is_the_min_of_sources() {
        let a = from_fn(|| {
            ErrorCatching::Success(Expiring::expiring_at(
                Discrete::new(1),
                Duration::from_secs(10),
            ))
        });
        let b = from_fn(|| {
            ErrorCatching::Success(Expiring::expiring_at(
                Discrete::new(2),
                Duration::from_secs(3),
            ))
        });
        let sum = map2(&a, &b, |Discrete(x), Discrete(y)| Discrete::new(x + y));
        let state = sum.get_dynamics().into_result().unwrap();
        assert_eq!(state.expiry, Expiry::at(Duration::from_secs(3)));
    }

    #[test]
    fn failure_propagates_and_clears() {
        let a = ResourceCell::auto(Discrete::new(4i64));
        let b = constant(Discrete::new(10i64));
        let a_reader = a.reader();
        let derived = map2(&a_reader, &b, |Discrete(x), Discrete(y)| {
            Discrete::new(x * y)
        });
        assert_eq!(current_value(&derived).unwrap(), 40);

        // A failing effect on the source fails the derivation.
        a.emit(
            TaskId(0),
            DynamicsEffect::fallible("divide by zero", |_| {
                Err(SimError::derivation("divide by zero"))
            }),
        );
        assert!(derived.get_dynamics().is_failure());

        // Recovery on the source clears the derivation with no manual
        // intervention.
        a.set(TaskId(0), Discrete::new(5));
        assert_eq!(current_value(&derived).unwrap(), 50);
    }

    #[test]
    fn try_map_failures_are_recoverable() {
        let a = ResourceCell::auto(Discrete::new(-1i64));
        let a_reader = a.reader();
        let checked = try_map(&a_reader, |Discrete(n)| {
            if *n < 0 {
                Err(SimError::derivation("negative input"))
            } else {
                Ok(Discrete::new(*n))
            }
        });
        assert!(checked.get_dynamics().is_failure());
        a.set(TaskId(0), Discrete::new(6));
        assert_eq!(current_value(&checked).unwrap(), 6);
    }

    #[test]
    fn bind_selects_the_inner_resource() {
        let flag = constant(Discrete::new(true));
        let yes = constant(Discrete::new(1));
        let no = constant(Discrete::new(0));
        let chosen = bind(&flag, move |Discrete(b)| {
            if *b {
                yes.clone()
            } else {
                no.clone()
            }
        });
        assert_eq!(current_value(&chosen).unwrap(), 1);
    }

    proptest! {
        // The min-law for arbitrary horizons, not just the fixed values
        // above: map2 and bind both expire with the earlier source.
        #[test]
        fn combinators_obey_the_expiry_min_law(
            ea in -1_000_000i64..1_000_000,
            eb in -1_000_000i64..1_000_000,
        ) {
            let a = from_fn(move || {
                ErrorCatching::Success(Expiring::expiring_at(
                    Discrete::new(1),
                    Duration::from_micros(ea),
                ))
            });
            let b = from_fn(move || {
                ErrorCatching::Success(Expiring::expiring_at(
                    Discrete::new(2),
                    Duration::from_micros(eb),
                ))
            });
            let expected = Expiry::at(Duration::from_micros(ea.min(eb)));

            let summed = map2(&a, &b, |Discrete(x), Discrete(y)| Discrete::new(x + y));
            prop_assert_eq!(
                summed.get_dynamics().into_result().unwrap().expiry,
                expected
            );

            let chosen = {
                let b = b.clone();
                bind(&a, move |_| b.clone())
            };
            prop_assert_eq!(
                chosen.get_dynamics().into_result().unwrap().expiry,
                expected
            );
        }
    }

    #[test]
    fn erase_expiry_widens_to_never() {
        let a = from_fn(|| {
            ErrorCatching::Success(Expiring::expiring_at(Discrete::new(1), Duration::SECOND))
        });
        let erased = erase_expiry(&a);
        assert!(erased.get_dynamics().into_result().unwrap().expiry.is_never());
    }
}

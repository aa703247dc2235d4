//! Effects and their composition algebra.

use orrery_core::dynamics::are_equal_results;
use orrery_core::{Dynamics, ErrorCatching, Expiring, SimError};
use std::fmt;
use std::rc::Rc;

type EffectFn<D> = dyn Fn(&ErrorCatching<Expiring<D>>) -> ErrorCatching<Expiring<D>>;

/// A named, pure transformation of a cell's full state.
///
/// Effects operate on the error-catching, expiring dynamics as a whole:
/// an effect may inspect a failure, clear it, or produce one. Most
/// model code uses the [`DynamicsEffect::of`] and
/// [`DynamicsEffect::replace`] constructors rather than writing against
/// the full state.
///
/// The name travels into combined-effect names and error reports, so
/// a concurrency conflict can say *which* effects collided.
pub struct DynamicsEffect<D> {
    name: Rc<str>,
    apply: Rc<EffectFn<D>>,
}

impl<D> Clone for DynamicsEffect<D> {
    fn clone(&self) -> Self {
        Self {
            name: Rc::clone(&self.name),
            apply: Rc::clone(&self.apply),
        }
    }
}

impl<D> fmt::Debug for DynamicsEffect<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DynamicsEffect({})", self.name)
    }
}

impl<D: Dynamics> DynamicsEffect<D> {
    /// An effect written against the full cell state.
    pub fn new(
        name: impl Into<String>,
        f: impl Fn(&ErrorCatching<Expiring<D>>) -> ErrorCatching<Expiring<D>> + 'static,
    ) -> Self {
        Self {
            name: Rc::from(name.into()),
            apply: Rc::new(f),
        }
    }

    /// The identity effect.
    pub fn identity() -> Self {
        Self::new("no-op", |state| state.clone())
    }

    /// An effect over the bare dynamics value.
    ///
    /// The result carries no expiry of its own (effects produce fresh
    /// state, valid until something else bounds it). A failing cell
    /// stays failing: value-level effects cannot observe a failure.
    pub fn of(name: impl Into<String>, f: impl Fn(&D) -> D + 'static) -> Self {
        Self::new(name, move |state| {
            state
                .as_ref()
                .map(|e| Expiring::never(f(&e.data)))
        })
    }

    /// A value-level effect that may report a modeling error.
    ///
    /// Errors become a persistent [`ErrorCatching::Failure`] on the
    /// cell, cleared only by a later succeeding effect. This is the
    /// mechanism for surfacing modeling errors without terminating the
    /// whole simulation.
    pub fn fallible(
        name: impl Into<String>,
        f: impl Fn(&D) -> Result<D, SimError> + 'static,
    ) -> Self {
        Self::new(name, move |state| {
            state
                .as_ref()
                .and_then(|e| f(&e.data).map(Expiring::never).into())
        })
    }

    /// Overwrite the cell with `new_dynamics`, clearing any failure.
    pub fn replace(new_dynamics: D) -> Self {
        let name = format!("set {new_dynamics:?}");
        Self::new(name, move |_| {
            ErrorCatching::Success(Expiring::never(new_dynamics.clone()))
        })
    }

    /// Overwrite the cell with an explicit expiring state.
    pub fn replace_expiring(new_dynamics: Expiring<D>) -> Self {
        let name = format!("set {:?}", new_dynamics.data);
        Self::new(name, move |_| ErrorCatching::Success(new_dynamics.clone()))
    }

    /// Apply this effect to a cell state.
    pub fn apply(&self, state: &ErrorCatching<Expiring<D>>) -> ErrorCatching<Expiring<D>> {
        (self.apply)(state)
    }

    /// The effect's name, for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }
}

type Combine<D> = dyn Fn(&DynamicsEffect<D>, &DynamicsEffect<D>) -> DynamicsEffect<D>;

/// The composition rules governing how effects combine on one cell.
///
/// Sequential composition is fixed (apply in program order); the
/// concurrency-resolution policy is pluggable. Three canonical policies
/// exist: [`EffectTrait::noncommuting`], [`EffectTrait::commuting`],
/// and [`EffectTrait::auto`].
pub struct EffectTrait<D> {
    combine_concurrent: Rc<Combine<D>>,
}

impl<D> Clone for EffectTrait<D> {
    fn clone(&self) -> Self {
        Self {
            combine_concurrent: Rc::clone(&self.combine_concurrent),
        }
    }
}

impl<D: Dynamics> EffectTrait<D> {
    /// The identity effect for this algebra.
    pub fn empty(&self) -> DynamicsEffect<D> {
        DynamicsEffect::identity()
    }

    /// Ordered composition: `prefix`, then `suffix`.
    pub fn sequentially(
        &self,
        prefix: &DynamicsEffect<D>,
        suffix: &DynamicsEffect<D>,
    ) -> DynamicsEffect<D> {
        let name = format!("({}) then ({})", prefix.name(), suffix.name());
        let (prefix, suffix) = (prefix.clone(), suffix.clone());
        DynamicsEffect::new(name, move |state| suffix.apply(&prefix.apply(state)))
    }

    /// Composition of effects with no program-order relation.
    pub fn concurrently(
        &self,
        left: &DynamicsEffect<D>,
        right: &DynamicsEffect<D>,
    ) -> DynamicsEffect<D> {
        (self.combine_concurrent)(left, right)
    }

    /// Build a trait from an arbitrary concurrency-resolution rule.
    pub fn resolving_concurrency_by(
        combine: impl Fn(&DynamicsEffect<D>, &DynamicsEffect<D>) -> DynamicsEffect<D> + 'static,
    ) -> Self {
        Self {
            combine_concurrent: Rc::new(combine),
        }
    }

    /// Any concurrency is an error: two effects at the same instant
    /// record a [`SimError::ConcurrentEffectsForbidden`] failure on the
    /// cell, regardless of whether they would have commuted.
    pub fn noncommuting() -> Self {
        Self::resolving_concurrency_by(|left, right| {
            let error = SimError::ConcurrentEffectsForbidden {
                left: left.name().to_string(),
                right: right.name().to_string(),
            };
            let name = format!("({}) and ({})", left.name(), right.name());
            DynamicsEffect::new(name, move |_| ErrorCatching::Failure(error.clone()))
        })
    }

    /// Concurrency resolved without checking, in an arbitrary but fixed
    /// order (first emission first). Commutativity is the caller's
    /// responsibility.
    pub fn commuting() -> Self {
        Self::resolving_concurrency_by(|left, right| {
            let name = format!("({}) and ({})", left.name(), right.name());
            let (left, right) = (left.clone(), right.clone());
            DynamicsEffect::new(name, move |state| right.apply(&left.apply(state)))
        })
    }

    /// Apply both orderings and require equal results.
    ///
    /// This is a correctness check, not a resolution strategy: it
    /// demands that concurrent effects be genuinely independent, and
    /// converts silent nondeterminism into a
    /// [`SimError::NonCommutingEffects`] failure.
    pub fn auto() -> Self {
        Self::resolving_concurrency_by(|left, right| {
            let name = format!("({}) and ({})", left.name(), right.name());
            let error = SimError::NonCommutingEffects {
                left: left.name().to_string(),
                right: right.name().to_string(),
            };
            let (left, right) = (left.clone(), right.clone());
            DynamicsEffect::new(name, move |state| {
                let lr = right.apply(&left.apply(state));
                let rl = left.apply(&right.apply(state));
                if are_equal_results(state, &lr, &rl) {
                    lr
                } else {
                    ErrorCatching::Failure(error.clone())
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::Discrete;
    use proptest::prelude::*;

    type State = ErrorCatching<Expiring<Discrete<i64>>>;

    fn state(n: i64) -> State {
        ErrorCatching::Success(Expiring::never(Discrete::new(n)))
    }

    fn affine(a: i64, b: i64) -> DynamicsEffect<Discrete<i64>> {
        DynamicsEffect::of(format!("affine {a} {b}"), move |Discrete(n)| {
            Discrete::new(a * n + b)
        })
    }

    fn value(s: &State) -> i64 {
        s.success().expect("expected success").data.0
    }

    #[test]
    fn value_effects_leave_failures_in_place() {
        let failing: State = ErrorCatching::Failure(SimError::derivation("broken"));
        let out = affine(1, 1).apply(&failing);
        assert!(out.is_failure());
    }

    #[test]
    fn replace_clears_a_failure() {
        let failing: State = ErrorCatching::Failure(SimError::derivation("broken"));
        let out = DynamicsEffect::replace(Discrete::new(7)).apply(&failing);
        assert_eq!(value(&out), 7);
    }

    #[test]
    fn auto_accepts_commuting_effects() {
        let algebra = EffectTrait::auto();
        let combined = algebra.concurrently(&affine(1, 2), &affine(1, 3));
        assert_eq!(value(&combined.apply(&state(10))), 15);
    }

    #[test]
    fn auto_rejects_noncommuting_effects() {
        let algebra = EffectTrait::auto();
        let combined = algebra.concurrently(&affine(3, 0), &affine(1, 1));
        let out = combined.apply(&state(10));
        assert!(matches!(
            out.failure(),
            Some(SimError::NonCommutingEffects { .. })
        ));
    }

    #[test]
    fn noncommuting_rejects_even_commuting_effects() {
        let algebra = EffectTrait::noncommuting();
        let combined = algebra.concurrently(&affine(1, 2), &affine(1, 3));
        assert!(matches!(
            combined.apply(&state(0)).failure(),
            Some(SimError::ConcurrentEffectsForbidden { .. })
        ));
    }

    #[test]
    fn commuting_applies_in_first_emission_order() {
        let algebra = EffectTrait::commuting();
        let combined = algebra.concurrently(&affine(3, 0), &affine(1, 1));
        // left first: 3*10 = 30, then +1.
        assert_eq!(value(&combined.apply(&state(10))), 31);
    }

    proptest! {
        // empty is a two-sided identity for sequential composition,
        // checked extensionally.
        #[test]
        fn empty_is_identity_for_sequentially(a in -100i64..100, b in -100i64..100, n in -1000i64..1000) {
            for algebra in [EffectTrait::auto(), EffectTrait::commuting(), EffectTrait::noncommuting()] {
                let e = affine(a, b);
                let s = state(n);
                let left = algebra.sequentially(&algebra.empty(), &e).apply(&s);
                let right = algebra.sequentially(&e, &algebra.empty()).apply(&s);
                prop_assert_eq!(left.clone(), e.apply(&s));
                prop_assert_eq!(right, e.apply(&s));
            }
        }

        #[test]
        fn sequentially_is_associative(
            a1 in -10i64..10, b1 in -10i64..10,
            a2 in -10i64..10, b2 in -10i64..10,
            a3 in -10i64..10, b3 in -10i64..10,
            n in -100i64..100,
        ) {
            let algebra = EffectTrait::<Discrete<i64>>::auto();
            let (e1, e2, e3) = (affine(a1, b1), affine(a2, b2), affine(a3, b3));
            let s = state(n);
            let left = algebra
                .sequentially(&algebra.sequentially(&e1, &e2), &e3)
                .apply(&s);
            let right = algebra
                .sequentially(&e1, &algebra.sequentially(&e2, &e3))
                .apply(&s);
            prop_assert_eq!(left, right);
        }
    }
}

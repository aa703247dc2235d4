//! Conditions: the boundary value consumed by the external scheduler.
//!
//! The cooperative scheduler's `wait_until` primitive polls a
//! [`Condition`] to find the next instant at which it holds. This crate
//! only constructs conditions; scheduling them is the external
//! collaborator's job.

use crate::resource::ResourceRef;
use orrery_core::{Duration, Dynamics, ErrorCatching};
use std::rc::Rc;

type ConditionFn = dyn Fn(bool, Duration, Duration, Duration) -> Option<Duration>;

/// A query for the next instant at which some predicate holds.
///
/// Evaluated as `condition.evaluate(positive, elapsed, at_earliest,
/// at_latest)`, where `elapsed` is the simulated time since the
/// condition was created (the scheduler tracks this), and the answer is
/// the earliest offset in `[at_earliest, at_latest]` at which the
/// predicate has truth value `positive`, or `None` if there is no such
/// offset in the window.
pub struct Condition(Rc<ConditionFn>);

impl Clone for Condition {
    fn clone(&self) -> Self {
        Condition(Rc::clone(&self.0))
    }
}

impl Condition {
    /// Build a condition from its polling function.
    pub fn new(
        f: impl Fn(bool, Duration, Duration, Duration) -> Option<Duration> + 'static,
    ) -> Self {
        Condition(Rc::new(f))
    }

    /// The never-satisfied condition.
    pub fn never() -> Self {
        Condition::new(|positive, _, at_earliest, _| {
            if positive {
                None
            } else {
                Some(at_earliest)
            }
        })
    }

    /// Poll this condition.
    pub fn evaluate(
        &self,
        positive: bool,
        elapsed: Duration,
        at_earliest: Duration,
        at_latest: Duration,
    ) -> Option<Duration> {
        (self.0)(positive, elapsed, at_earliest, at_latest)
    }

    /// Disjunction: satisfied when either condition is.
    pub fn or(&self, other: &Condition) -> Condition {
        let (a, b) = (self.clone(), other.clone());
        Condition::new(move |positive, elapsed, at_earliest, at_latest| {
            let ra = a.evaluate(positive, elapsed, at_earliest, at_latest);
            let rb = b.evaluate(positive, elapsed, at_earliest, at_latest);
            if positive {
                // Earliest instant at which either holds.
                match (ra, rb) {
                    (Some(ta), Some(tb)) => Some(ta.min(tb)),
                    (a, b) => a.or(b),
                }
            } else {
                // Both must be false; wait for the later one.
                match (ra, rb) {
                    (Some(ta), Some(tb)) => Some(ta.max(tb)),
                    _ => None,
                }
            }
        })
    }
}

/// Triggered when the resource's dynamics change in a way that differs
/// from just evolving with time.
///
/// This covers effects on an underlying cell and derivations whose
/// current value expires: in either case the resource's dynamics no
/// longer equal the stepped-forward snapshot taken at creation.
pub fn dynamics_change<D: Dynamics>(resource: &ResourceRef<D>) -> Condition {
    let resource = resource.clone();
    let start = resource.get_dynamics();
    Condition::new(move |positive, elapsed, at_earliest, at_latest| {
        let current = resource.get_dynamics();
        let changed = match (&start, &current) {
            (ErrorCatching::Success(s), ErrorCatching::Success(c)) => {
                c.data != s.data.step(elapsed)
            }
            // Derivations can rebuild an equivalent error on every
            // read, so failures compare semantically.
            (ErrorCatching::Failure(s), ErrorCatching::Failure(c)) => s != c,
            _ => true,
        };
        if positive == changed {
            Some(at_earliest)
        } else if positive {
            // Unchanged so far; the next possible change is when the
            // current dynamics expire.
            match &current {
                ErrorCatching::Success(c) => {
                    c.expiry.value().filter(|t| *t <= at_latest)
                }
                ErrorCatching::Failure(_) => None,
            }
        } else {
            None
        }
    })
}

/// Triggered when the resource's current value expires.
pub fn expires<D: Dynamics>(resource: &ResourceRef<D>) -> Condition {
    let resource = resource.clone();
    Condition::new(move |positive, _, at_earliest, at_latest| {
        if !positive {
            return None;
        }
        match resource.get_dynamics() {
            ErrorCatching::Success(c) => c
                .expiry
                .value()
                .filter(|t| *t <= at_latest)
                .map(|t| t.max(at_earliest)),
            ErrorCatching::Failure(_) => None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell_resource::ResourceCell;
    use crate::resource::from_fn;
    use orrery_core::{Discrete, Expiring, TaskId};

    const WINDOW: (Duration, Duration) = (Duration::ZERO, Duration::MAX);

    #[test]
    fn never_condition_is_never_positive() {
        let c = Condition::never();
        assert_eq!(c.evaluate(true, Duration::ZERO, WINDOW.0, WINDOW.1), None);
        assert_eq!(
            c.evaluate(false, Duration::ZERO, WINDOW.0, WINDOW.1),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn dynamics_change_fires_on_effects() {
        let cell = ResourceCell::auto(Discrete::new(1));
        let c = dynamics_change(&cell.reader());
        assert_eq!(c.evaluate(true, Duration::ZERO, WINDOW.0, WINDOW.1), None);
        cell.set(TaskId(0), Discrete::new(2));
        assert_eq!(
            c.evaluate(true, Duration::ZERO, WINDOW.0, WINDOW.1),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn dynamics_change_ignores_plain_time_evolution() {
        let cell = ResourceCell::auto(orrery_core::Clock::starting_at(Duration::ZERO));
        let c = dynamics_change(&cell.reader());
        cell.step(Duration::from_secs(5));
        // The clock advanced, but exactly as stepping predicts.
        assert_eq!(
            c.evaluate(true, Duration::from_secs(5), WINDOW.0, WINDOW.1),
            None
        );
    }

    #[test]
    fn expires_reports_the_validity_horizon() {
        let r = from_fn(|| {
            ErrorCatching::Success(Expiring::expiring_at(
                Discrete::new(1),
                Duration::from_secs(3),
            ))
        });
        let c = expires(&r);
        assert_eq!(
            c.evaluate(true, Duration::ZERO, WINDOW.0, WINDOW.1),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn or_takes_the_earlier_positive() {
        let sooner = Condition::new(|_, _, _, _| Some(Duration::from_secs(1)));
        let later = Condition::new(|_, _, _, _| Some(Duration::from_secs(5)));
        let either = sooner.or(&later);
        assert_eq!(
            either.evaluate(true, Duration::ZERO, WINDOW.0, WINDOW.1),
            Some(Duration::from_secs(1))
        );
    }
}

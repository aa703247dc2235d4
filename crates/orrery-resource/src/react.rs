//! Caching and signalling wrappers around pull-based resources.
//!
//! Derivations recompute on every read. When that is too expensive, a
//! [`CachedResource`] snapshots the source into an owned cell and serves
//! reads from there; the owner re-runs [`CachedResource::refresh`]
//! whenever [`CachedResource::stale_condition`] fires. A
//! [`SignallingResource`] is the lighter variant for waking conditions
//! without copying the dynamics.

use crate::cell_resource::ResourceCell;
use crate::condition::{dynamics_change, Condition};
use crate::resource::{Resource, ResourceRef};
use orrery_cell::{DynamicsEffect, EffectTrait};
use orrery_core::{Discrete, Dynamics, ErrorCatching, Expiring, TaskId};

/// A resource serving reads from a cell-held snapshot of its source.
///
/// The snapshot steps with time like any cell state, so a cache only
/// goes stale when the source changes in a way time evolution does not
/// predict. Refreshing is explicit: the caller owns the reaction loop.
pub struct CachedResource<D: Dynamics> {
    source: ResourceRef<D>,
    cache: ResourceCell<D>,
}

impl<D: Dynamics> Clone for CachedResource<D> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<D: Dynamics> CachedResource<D> {
    /// Snapshot `source` into a fresh cache.
    pub fn new(source: &ResourceRef<D>) -> Self {
        let cache = ResourceCell::with_state(source.get_dynamics(), EffectTrait::commuting());
        Self {
            source: source.clone(),
            cache,
        }
    }

    /// Re-snapshot the source, overwriting whatever the cache held.
    ///
    /// Refreshes commute (last snapshot of the same source wins with the
    /// same result), so concurrent refreshes at one instant are safe.
    pub fn refresh(&self, task: TaskId) {
        let snapshot = self.source.get_dynamics();
        tracing::trace!(failing = snapshot.is_failure(), "refresh cache");
        self.cache.emit(
            task,
            DynamicsEffect::new("refresh cache", move |_| snapshot.clone()),
        );
    }

    /// Fires when the cache no longer agrees with the source.
    pub fn stale_condition(&self) -> Condition {
        let this = self.clone();
        Condition::new(move |positive, _, at_earliest, at_latest| {
            let cached = this.cache.get_dynamics();
            let fresh = this.source.get_dynamics();
            let stale = cached != fresh;
            if positive == stale {
                return Some(at_earliest);
            }
            if positive {
                // In agreement now; the earliest divergence is when
                // either side's dynamics expire.
                let horizon = expiry_of(&cached).or(expiry_of(&fresh));
                horizon.value().filter(|t| *t <= at_latest)
            } else {
                None
            }
        })
    }

    /// Advance the cache across `dt` of simulated time.
    pub fn step(&self, dt: orrery_core::Duration) {
        self.cache.step(dt);
    }

    /// A read-only handle serving cached reads.
    pub fn reader(&self) -> ResourceRef<D> {
        std::rc::Rc::new(self.clone())
    }
}

fn expiry_of<D: Dynamics>(state: &ErrorCatching<Expiring<D>>) -> orrery_core::Expiry {
    match state {
        ErrorCatching::Success(e) => e.expiry,
        ErrorCatching::Failure(_) => orrery_core::Expiry::NEVER,
    }
}

impl<D: Dynamics> Resource<D> for CachedResource<D> {
    fn get_dynamics(&self) -> ErrorCatching<Expiring<D>> {
        self.cache.get_dynamics()
    }
}

/// A resource paired with an owned signal cell.
///
/// Reads pass straight through to the source; [`SignallingResource::signal`]
/// bumps a counter cell so that [`SignallingResource::update_condition`]
/// fires without the wrapper having to compare dynamics. Useful for
/// sources whose equality is expensive or purely nominal.
pub struct SignallingResource<D: Dynamics> {
    source: ResourceRef<D>,
    signal: ResourceCell<Discrete<u64>>,
}

impl<D: Dynamics> Clone for SignallingResource<D> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            signal: self.signal.clone(),
        }
    }
}

impl<D: Dynamics> SignallingResource<D> {
    /// Wrap `source` with a fresh signal cell.
    pub fn new(source: &ResourceRef<D>) -> Self {
        Self {
            source: source.clone(),
            signal: ResourceCell::new(Discrete::new(0), EffectTrait::commuting()),
        }
    }

    /// Announce that the source has changed.
    pub fn signal(&self, task: TaskId) {
        self.signal.emit(
            task,
            DynamicsEffect::of("signal update", |Discrete(n)| Discrete::new(n + 1)),
        );
    }

    /// Fires once per [`SignallingResource::signal`] call.
    pub fn update_condition(&self) -> Condition {
        dynamics_change(&self.signal.reader())
    }

    /// A read-only pass-through handle to the source.
    pub fn reader(&self) -> ResourceRef<D> {
        std::rc::Rc::new(self.clone())
    }
}

impl<D: Dynamics> Resource<D> for SignallingResource<D> {
    fn get_dynamics(&self) -> ErrorCatching<Expiring<D>> {
        self.source.get_dynamics()
    }
}

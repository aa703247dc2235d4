//! The single-writer mutable state box.

use crate::effect::{DynamicsEffect, EffectTrait};
use indexmap::IndexMap;
use orrery_core::{Duration, Dynamics, ErrorCatching, Expiring, TaskId};

/// A cell owns exactly one expiring dynamics and is mutated only
/// through emitted effects.
///
/// Effects emitted at the current instant accumulate in a pending
/// batch: effects from one task fold `sequentially` in emission order,
/// and the per-task folds combine `concurrently` (in first-emission
/// order) under the cell's [`EffectTrait`]. Advancing time commits the
/// batch.
///
/// Stepping always re-steps from the dynamics as of the last commit
/// rather than from the previous step's output, so imperfect stepping
/// does not accumulate round-off error.
pub struct Cell<D: Dynamics> {
    /// Dynamics as of the last effect commit.
    initial: ErrorCatching<Expiring<D>>,
    /// `initial` stepped forward by `elapsed`.
    current: ErrorCatching<Expiring<D>>,
    /// Time since the last commit.
    elapsed: Duration,
    algebra: EffectTrait<D>,
    pending: IndexMap<TaskId, DynamicsEffect<D>>,
}

impl<D: Dynamics> Cell<D> {
    /// Allocate a cell holding `initial` with no expiry.
    pub fn new(initial: D, algebra: EffectTrait<D>) -> Self {
        Self::with_state(ErrorCatching::Success(Expiring::never(initial)), algebra)
    }

    /// Allocate a cell from a full initial state.
    pub fn with_state(initial: ErrorCatching<Expiring<D>>, algebra: EffectTrait<D>) -> Self {
        Self {
            current: initial.clone(),
            initial,
            elapsed: Duration::ZERO,
            algebra,
            pending: IndexMap::new(),
        }
    }

    /// Append an effect for the current instant on behalf of `task`.
    ///
    /// Repeated emissions from the same task are in program order and
    /// fold sequentially; emissions from distinct tasks are concurrent.
    pub fn emit(&mut self, task: TaskId, effect: DynamicsEffect<D>) {
        let algebra = self.algebra.clone();
        match self.pending.get_mut(&task) {
            Some(chain) => *chain = algebra.sequentially(chain, &effect),
            None => {
                self.pending.insert(task, effect);
            }
        }
    }

    /// The cell's state with every effect emitted so far folded in.
    pub fn read(&self) -> ErrorCatching<Expiring<D>> {
        match self.fold_pending() {
            Some(batch) => batch.apply(&self.current),
            None => self.current.clone(),
        }
    }

    /// Advance the cell across `dt` of simulated time.
    ///
    /// Commits the pending effect batch for the closing instant, then
    /// steps the dynamics and shortens its expiry by `dt`. The cell
    /// does not forbid stepping past the expiry; derived resources are
    /// responsible for recomputing rather than trusting a stale value.
    pub fn step(&mut self, dt: Duration) {
        self.commit();
        self.elapsed += dt;
        let elapsed = self.elapsed;
        self.current = self
            .initial
            .clone()
            .map(|e| Expiring::new(e.data.step(elapsed), e.expiry.minus(elapsed)));
    }

    /// Fold and apply the pending batch without advancing time.
    pub fn commit(&mut self) {
        if let Some(batch) = self.fold_pending() {
            self.initial = batch.apply(&self.current);
            self.current = self.initial.clone();
            self.elapsed = Duration::ZERO;
            self.pending.clear();
        }
    }

    fn fold_pending(&self) -> Option<DynamicsEffect<D>> {
        let mut chains = self.pending.values();
        let first = chains.next()?.clone();
        Some(chains.fold(first, |acc, chain| self.algebra.concurrently(&acc, chain)))
    }

    /// The effect algebra governing this cell.
    pub fn algebra(&self) -> &EffectTrait<D> {
        &self.algebra
    }
}

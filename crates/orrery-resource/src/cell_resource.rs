//! The writable, cell-backed resource.

use crate::resource::{Resource, ResourceRef};
use orrery_cell::{Cell, DynamicsEffect, EffectTrait};
use orrery_core::{Duration, Dynamics, ErrorCatching, Expiring, SourceId, TaskId};
use std::cell::RefCell;
use std::rc::Rc;

/// A resource backed directly by one owned [`Cell`].
///
/// Effects can be applied to this resource; reading returns the cell's
/// current error-catching expiring state. Each cell has exactly one
/// writer role (effect emission) and unlimited readers — the effect
/// trait, not a lock, arbitrates conflicting concurrent writes.
pub struct ResourceCell<D: Dynamics> {
    id: SourceId,
    cell: Rc<RefCell<Cell<D>>>,
}

impl<D: Dynamics> Clone for ResourceCell<D> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            cell: Rc::clone(&self.cell),
        }
    }
}

impl<D: Dynamics> ResourceCell<D> {
    /// Allocate with an explicit effect trait.
    pub fn new(initial: D, algebra: EffectTrait<D>) -> Self {
        Self::with_state(ErrorCatching::Success(Expiring::never(initial)), algebra)
    }

    /// Allocate with the auto effect trait.
    ///
    /// Most resources see few effects and fewer concurrent ones, so the
    /// commutativity-checking default is performant enough; choose a
    /// specialized trait where it is not.
    pub fn auto(initial: D) -> Self {
        Self::new(initial, EffectTrait::auto())
    }

    /// Allocate from a full initial state.
    pub fn with_state(initial: ErrorCatching<Expiring<D>>, algebra: EffectTrait<D>) -> Self {
        Self {
            id: SourceId::next(),
            cell: Rc::new(RefCell::new(Cell::with_state(initial, algebra))),
        }
    }

    /// This resource's stable identity, for introspection tables.
    pub fn id(&self) -> SourceId {
        self.id
    }

    /// Emit an effect at the current instant on behalf of `task`.
    pub fn emit(&self, task: TaskId, effect: DynamicsEffect<D>) {
        tracing::trace!(source = %self.id, task = %task, effect = %effect.name(), "emit");
        self.cell.borrow_mut().emit(task, effect);
    }

    /// Overwrite the dynamics, clearing any stored failure.
    pub fn set(&self, task: TaskId, new_dynamics: D) {
        self.emit(task, DynamicsEffect::replace(new_dynamics));
    }

    /// Advance the owned cell across `dt` of simulated time.
    ///
    /// Driven by the simulation engine when logical time advances; not
    /// called from model code.
    pub fn step(&self, dt: Duration) {
        self.cell.borrow_mut().step(dt);
    }

    /// A read-only handle to this resource.
    ///
    /// Exposed as [`ResourceRef`], not `ResourceCell`, where the caller
    /// must not emit effects (e.g. solver output variables).
    pub fn reader(&self) -> ResourceRef<D> {
        Rc::new(self.clone())
    }
}

impl<D: Dynamics> Resource<D> for ResourceCell<D> {
    fn get_dynamics(&self) -> ErrorCatching<Expiring<D>> {
        self.cell.borrow().read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::current_value;
    use orrery_core::Discrete;

    #[test]
    fn set_overwrites_and_reader_sees_it() {
        let rc = ResourceCell::auto(Discrete::new(1));
        let reader = rc.reader();
        rc.set(TaskId(0), Discrete::new(9));
        assert_eq!(current_value(&reader).unwrap(), 9);
    }

    #[test]
    fn reads_are_shared_across_handles() {
        let rc = ResourceCell::auto(Discrete::new(1));
        let other = rc.clone();
        other.set(TaskId(0), Discrete::new(3));
        assert_eq!(current_value(&rc.reader()).unwrap(), 3);
    }
}

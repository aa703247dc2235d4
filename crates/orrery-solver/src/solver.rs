//! The arc-consistency solve loop and its variables.

use crate::expr::{
    Comparison, DirectionalConstraint, Domain, GeneralConstraint, InequalityComparison,
    LinearExpression, VariableId,
};
use crate::polynomial::Polynomial;
use orrery_cell::{DynamicsEffect, EffectTrait};
use orrery_core::{Duration, ErrorCatching, Expiring, Expiry, SimError, TaskId};
use orrery_resource::cell_resource::ResourceCell;
use orrery_resource::condition::{dynamics_change, Condition};
use orrery_resource::{Resource, ResourceRef};
use std::collections::VecDeque;
use std::rc::Rc;

type PolicyFn = dyn Fn(&Domain) -> Expiring<Polynomial>;

/// How an under-constrained variable collapses its domain to a point.
///
/// Applied only after arc consistency stalls with the variable still
/// unsolved; a fully determined variable never consults its policy.
pub struct SelectionPolicy(Rc<PolicyFn>);

impl Clone for SelectionPolicy {
    fn clone(&self) -> Self {
        SelectionPolicy(Rc::clone(&self.0))
    }
}

impl SelectionPolicy {
    /// An arbitrary selection rule.
    pub fn new(f: impl Fn(&Domain) -> Expiring<Polynomial> + 'static) -> Self {
        SelectionPolicy(Rc::new(f))
    }

    /// Take the domain's upper bound.
    pub fn upper_bound() -> Self {
        Self::new(|domain| domain.upper_bound().clone())
    }

    /// Take the domain's lower bound.
    pub fn lower_bound() -> Self {
        Self::new(|domain| domain.lower_bound().clone())
    }

    fn select(&self, domain: &Domain) -> Expiring<Polynomial> {
        (self.0)(domain)
    }
}

/// A solver-owned polynomial quantity.
///
/// The solver is the only writer of the backing cell; model code reads
/// the solution through [`Variable::resource`] and must not emit
/// effects on it.
pub struct Variable {
    id: VariableId,
    name: Rc<str>,
    cell: ResourceCell<Polynomial>,
}

impl Clone for Variable {
    fn clone(&self) -> Self {
        Variable {
            id: self.id,
            name: Rc::clone(&self.name),
            cell: self.cell.clone(),
        }
    }
}

impl Variable {
    /// This variable's index within its solver.
    pub fn id(&self) -> VariableId {
        self.id
    }

    /// The name given at declaration.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Read-only access to the solved value.
    pub fn resource(&self) -> ResourceRef<Polynomial> {
        self.cell.reader()
    }
}

struct VariableSlot {
    handle: Variable,
    policy: SelectionPolicy,
}

/// Resolves a network of linear constraints over polynomial resources
/// by directional arc consistency.
///
/// Declare variables and constraints at model-build time, then run
/// [`LinearArcConsistencySolver::solve`] once everything is declared,
/// and again whenever [`LinearArcConsistencySolver::resolve_condition`]
/// fires. Each pass narrows per-variable domains from unbounded to a
/// point, emits the solution into every variable's cell at a shared
/// expiry, and on failure marks every variable infeasible instead.
pub struct LinearArcConsistencySolver {
    name: String,
    slots: Vec<VariableSlot>,
    driven_terms: Vec<ResourceRef<Polynomial>>,
    constraints: Vec<DirectionalConstraint>,
}

impl LinearArcConsistencySolver {
    /// An empty solver. The name appears in logs and infeasibility
    /// errors.
    pub fn new(name: impl Into<String>) -> Self {
        LinearArcConsistencySolver {
            name: name.into(),
            slots: Vec::new(),
            driven_terms: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// Declare a variable. Declaration order is the tie-break order for
    /// under-constrained solves.
    pub fn variable(&mut self, name: impl Into<String>, policy: SelectionPolicy) -> Variable {
        let handle = Variable {
            id: VariableId(self.slots.len()),
            name: Rc::from(name.into()),
            cell: ResourceCell::new(Polynomial::constant(0.0), EffectTrait::auto()),
        };
        self.slots.push(VariableSlot {
            handle: handle.clone(),
            policy,
        });
        handle
    }

    /// Declare the constraint `left <cmp> right`.
    pub fn declare(
        &mut self,
        left: LinearExpression,
        comparison: Comparison,
        right: LinearExpression,
    ) {
        self.declare_constraint(GeneralConstraint::new(left, comparison, right));
    }

    /// Declare a prebuilt constraint.
    pub fn declare_constraint(&mut self, constraint: GeneralConstraint) {
        let normalized = constraint.normalize();
        self.driven_terms.push(normalized.driven().clone());
        self.constraints.extend(normalized.standardize());
    }

    /// The condition under which the current solution must be
    /// recomputed: any driven term changes, or any solved variable does
    /// (which, given the solver's exclusive ownership, means its value
    /// expired).
    ///
    /// Snapshots are taken at creation, so obtain a fresh condition
    /// after every solve.
    pub fn resolve_condition(&self) -> Condition {
        let mut condition = Condition::never();
        for driven in &self.driven_terms {
            condition = condition.or(&dynamics_change(driven));
        }
        for slot in &self.slots {
            condition = condition.or(&dynamics_change(&slot.handle.resource()));
        }
        condition
    }

    /// Advance every variable's cell across `dt` of simulated time.
    pub fn step(&self, dt: Duration) {
        for slot in &self.slots {
            slot.handle.cell.step(dt);
        }
    }

    /// Run one solve pass and emit the outcome into every variable's
    /// cell on behalf of `task`.
    ///
    /// On success each variable receives its solved polynomial at the
    /// solution-wide expiry (the `or` of every bound expiry), clearing
    /// any prior failure. On an empty domain or a failing driven term,
    /// every variable not already failing receives the failure.
    pub fn solve(&self, task: TaskId) {
        tracing::debug!(solver = %self.name, "solving");
        let neighbors = self.neighboring_constraints();
        let mut domains: Vec<Domain> = self.slots.iter().map(|_| Domain::unbounded()).collect();
        match self.run_arc_consistency(&mut domains, &neighbors) {
            Ok(()) => {
                let solution_expiry = domains.iter().fold(Expiry::NEVER, |acc, domain| {
                    acc.or(domain.lower_bound().expiry().or(domain.upper_bound().expiry()))
                });
                for (slot, domain) in self.slots.iter().zip(&domains) {
                    let solved = Expiring::new(domain.lower_bound().data.clone(), solution_expiry);
                    tracing::debug!(
                        solver = %self.name,
                        variable = %slot.handle.name(),
                        value = %solved,
                        "solved"
                    );
                    let state = ErrorCatching::Success(solved);
                    slot.handle.cell.emit(
                        task,
                        DynamicsEffect::new(format!("solve {}", self.name), move |_| {
                            state.clone()
                        }),
                    );
                }
            }
            Err(error) => {
                tracing::debug!(solver = %self.name, error = %error, "solve failed");
                for slot in &self.slots {
                    // Cells that already failed stay untouched; repeating
                    // the failure would only add churn.
                    if slot.handle.cell.get_dynamics().is_failure() {
                        continue;
                    }
                    let state: ErrorCatching<Expiring<Polynomial>> =
                        ErrorCatching::Failure(error.clone());
                    slot.handle.cell.emit(
                        task,
                        DynamicsEffect::new(format!("solve {} failed", self.name), move |_| {
                            state.clone()
                        }),
                    );
                }
            }
        }
    }

    /// For each variable, the constraints it drives. Tightening that
    /// variable's domain requeues exactly these.
    fn neighboring_constraints(&self) -> Vec<Vec<usize>> {
        let mut neighbors = vec![Vec::new(); self.slots.len()];
        for (index, constraint) in self.constraints.iter().enumerate() {
            for driver in &constraint.driving {
                neighbors[driver.index()].push(index);
            }
        }
        neighbors
    }

    fn run_arc_consistency(
        &self,
        domains: &mut [Domain],
        neighbors: &[Vec<usize>],
    ) -> Result<(), SimError> {
        let mut queue: VecDeque<usize> = (0..self.constraints.len()).collect();
        loop {
            // Propagate bounds until no edge tightens anything.
            while let Some(index) = queue.pop_front() {
                let constraint = &self.constraints[index];
                let new_bound = (constraint.bound)(&*domains).into_result()?;
                let v = constraint.constrained.index();
                let changed = match constraint.comparison {
                    InequalityComparison::LessThanOrEquals => {
                        domains[v].restrict_upper(new_bound)
                    }
                    InequalityComparison::GreaterThanOrEquals => {
                        domains[v].restrict_lower(new_bound)
                    }
                };
                if changed {
                    tracing::trace!(
                        variable = %self.slots[v].handle.name(),
                        domain = %domains[v],
                        "restricted"
                    );
                    if domains[v].is_empty() {
                        return Err(SimError::Infeasible {
                            solver: self.name.clone(),
                            variable: self.slots[v].handle.name().to_string(),
                            lower: domains[v].lower_bound().to_string(),
                            upper: domains[v].upper_bound().to_string(),
                        });
                    }
                    queue.extend(neighbors[v].iter().copied());
                }
            }
            // Stalled. Collapse the first unsolved variable, in
            // declaration order, and propagate again.
            match domains.iter().position(Domain::is_unsolved) {
                Some(v) => {
                    let selection = self.slots[v].policy.select(&domains[v]);
                    tracing::trace!(
                        variable = %self.slots[v].handle.name(),
                        selection = %selection,
                        "stalled; selecting"
                    );
                    domains[v].collapse_to(selection);
                    queue.extend(neighbors[v].iter().copied());
                }
                None => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_core::Dynamics;
    use orrery_resource::{constant, current_data};

    #[test]
    fn unconstrained_variable_takes_its_policy_bound() {
        let mut solver = LinearArcConsistencySolver::new("unconstrained");
        let v = solver.variable("v", SelectionPolicy::lower_bound());
        solver.solve(TaskId(0));
        let solved = current_data(&v.resource()).expect("solve should succeed");
        assert_eq!(solved.extract(), f64::NEG_INFINITY);
    }

    #[test]
    fn failing_driven_term_fails_the_solve() {
        let mut solver = LinearArcConsistencySolver::new("bad driver");
        let v = solver.variable("v", SelectionPolicy::upper_bound());
        let driver: ResourceRef<Polynomial> = orrery_resource::from_fn(|| {
            ErrorCatching::Failure(SimError::derivation("driver offline"))
        });
        solver.declare(
            LinearExpression::variable(&v),
            Comparison::LessThanOrEquals,
            LinearExpression::resource(&driver),
        );
        solver.solve(TaskId(0));
        assert!(v.resource().get_dynamics().is_failure());
    }

    #[test]
    fn recovery_overwrites_a_prior_failure() {
        let mut solver = LinearArcConsistencySolver::new("recovery");
        let v = solver.variable("v", SelectionPolicy::upper_bound());
        let driver = ResourceCell::auto(Polynomial::constant(10.0));
        let reader = driver.reader();
        solver.declare(
            LinearExpression::variable(&v),
            Comparison::GreaterThanOrEquals,
            LinearExpression::resource(&reader),
        );
        solver.declare(
            LinearExpression::variable(&v),
            Comparison::LessThanOrEquals,
            LinearExpression::constant(5.0),
        );
        solver.solve(TaskId(0));
        assert!(v.resource().get_dynamics().is_failure());

        driver.set(TaskId(1), Polynomial::constant(0.0));
        solver.solve(TaskId(0));
        let solved = current_data(&v.resource()).expect("re-solve should clear the failure");
        assert_eq!(solved, Polynomial::constant(5.0));
    }

    #[test]
    fn driven_expiry_does_not_leak_into_the_solution() {
        let mut solver = LinearArcConsistencySolver::new("shared expiry");
        let a = solver.variable("a", SelectionPolicy::upper_bound());
        let b = solver.variable("b", SelectionPolicy::upper_bound());
        let expiring_driver: ResourceRef<Polynomial> = orrery_resource::from_fn(|| {
            ErrorCatching::Success(Expiring::expiring_at(
                Polynomial::constant(4.0),
                Duration::from_secs(7),
            ))
        });
        solver.declare(
            LinearExpression::variable(&a),
            Comparison::Equals,
            LinearExpression::resource(&expiring_driver),
        );
        solver.declare(
            LinearExpression::variable(&b),
            Comparison::LessThanOrEquals,
            LinearExpression::variable(&a),
        );
        solver.solve(TaskId(0));
        let a_state = v_state(&a);
        let b_state = v_state(&b);
        assert_eq!(a_state.data, Polynomial::constant(4.0));
        assert_eq!(b_state.data, Polynomial::constant(4.0));
        // Driven-term expiries are recaptured by re-solving, never
        // carried into the emitted solution. The shared expiry is the
        // `or` over all bound expiries, identical for every variable.
        assert_eq!(a_state.expiry, b_state.expiry);
        assert!(a_state.expiry.is_never());
    }

    fn v_state(v: &Variable) -> Expiring<Polynomial> {
        v.resource()
            .get_dynamics()
            .into_result()
            .expect("variable should be solved")
    }

    #[test]
    fn constant_helper_builds_a_plain_resource() {
        let r = constant(Polynomial::new([1.0, 2.0]));
        assert_eq!(current_data(&r).unwrap(), Polynomial::new([1.0, 2.0]));
    }
}

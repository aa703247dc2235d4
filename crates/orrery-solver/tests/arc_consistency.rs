//! End-to-end solves against the public solver API.

use orrery_core::{Duration, SimError, TaskId};
use orrery_resource::{current_data, ResourceCell, ResourceRef};
use orrery_solver::{
    Comparison, LinearArcConsistencySolver, LinearExpression, Polynomial, SelectionPolicy,
    Variable,
};

const SOLVER_TASK: TaskId = TaskId(0);
const MODEL_TASK: TaskId = TaskId(1);

fn solved(v: &Variable) -> Polynomial {
    current_data(&v.resource()).expect("variable should be solved")
}

#[test]
fn bounded_variable_solves_to_its_selected_bound() {
    let mut solver = LinearArcConsistencySolver::new("fixed point");
    let v = solver.variable("v", SelectionPolicy::upper_bound());
    solver.declare(
        LinearExpression::variable(&v),
        Comparison::LessThanOrEquals,
        LinearExpression::constant(10.0),
    );
    solver.declare(
        LinearExpression::variable(&v),
        Comparison::GreaterThanOrEquals,
        LinearExpression::constant(0.0),
    );
    solver.solve(SOLVER_TASK);
    assert_eq!(solved(&v), Polynomial::constant(10.0));
}

#[test]
fn tightening_a_bound_and_resolving_moves_the_solution() {
    let mut solver = LinearArcConsistencySolver::new("tighten");
    let v = solver.variable("v", SelectionPolicy::upper_bound());
    let upper = ResourceCell::auto(Polynomial::constant(10.0));
    let upper_reader = upper.reader();
    solver.declare(
        LinearExpression::variable(&v),
        Comparison::LessThanOrEquals,
        LinearExpression::resource(&upper_reader),
    );
    solver.declare(
        LinearExpression::variable(&v),
        Comparison::GreaterThanOrEquals,
        LinearExpression::constant(0.0),
    );
    solver.solve(SOLVER_TASK);
    assert_eq!(solved(&v), Polynomial::constant(10.0));

    upper.set(MODEL_TASK, Polynomial::constant(5.0));
    solver.solve(SOLVER_TASK);
    assert_eq!(solved(&v), Polynomial::constant(5.0));
}

#[test]
fn crossed_bounds_are_infeasible() {
    let mut solver = LinearArcConsistencySolver::new("infeasible");
    let v = solver.variable("v", SelectionPolicy::upper_bound());
    solver.declare(
        LinearExpression::variable(&v),
        Comparison::LessThanOrEquals,
        LinearExpression::constant(5.0),
    );
    solver.declare(
        LinearExpression::variable(&v),
        Comparison::GreaterThanOrEquals,
        LinearExpression::constant(6.0),
    );
    solver.solve(SOLVER_TASK);
    let error = v
        .resource()
        .get_dynamics()
        .failure()
        .cloned()
        .expect("solve should fail");
    assert!(matches!(error, SimError::Infeasible { .. }));
}

#[test]
fn coefficients_invert_into_the_solution() {
    // 4v <= 10 resolves to v = 2.5 under the upper-bound policy.
    let mut solver = LinearArcConsistencySolver::new("scaling");
    let v = solver.variable("v", SelectionPolicy::upper_bound());
    solver.declare(
        LinearExpression::variable(&v).multiply(4.0),
        Comparison::LessThanOrEquals,
        LinearExpression::constant(10.0),
    );
    solver.solve(SOLVER_TASK);
    assert_eq!(solved(&v), Polynomial::constant(2.5));
}

#[test]
fn negative_coefficients_flip_the_comparison() {
    // -2v <= -10 is v >= 5; the lower-bound policy lands exactly there.
    let mut solver = LinearArcConsistencySolver::new("negative scaling");
    let v = solver.variable("v", SelectionPolicy::lower_bound());
    solver.declare(
        LinearExpression::variable(&v).multiply(-2.0),
        Comparison::LessThanOrEquals,
        LinearExpression::constant(-10.0),
    );
    solver.solve(SOLVER_TASK);
    assert_eq!(solved(&v), Polynomial::constant(5.0));
}

#[test]
fn competing_lower_bounds_use_dominance() {
    // Two tangent lower bounds: equal value now, different slopes. The
    // steeper one dominates.
    let mut solver = LinearArcConsistencySolver::new("tangent bounds");
    let v = solver.variable("v", SelectionPolicy::lower_bound());
    for bound in [
        Polynomial::new([12.0, 3.0, 5.0]),
        Polynomial::new([12.0, 4.0, -1.0]),
    ] {
        let r: ResourceRef<Polynomial> = orrery_resource::constant(bound);
        solver.declare(
            LinearExpression::variable(&v),
            Comparison::GreaterThanOrEquals,
            LinearExpression::resource(&r),
        );
    }
    solver.declare(
        LinearExpression::variable(&v),
        Comparison::LessThanOrEquals,
        LinearExpression::constant(100.0),
    );
    solver.solve(SOLVER_TASK);
    assert_eq!(solved(&v), Polynomial::new([12.0, 4.0, -1.0]));
}

#[test]
fn solutions_evolve_with_time() {
    let mut solver = LinearArcConsistencySolver::new("evolution");
    let v = solver.variable("v", SelectionPolicy::upper_bound());
    let driver = ResourceCell::auto(Polynomial::new([20.0, -1.0, 3.0]));
    let reader = driver.reader();
    solver.declare(
        LinearExpression::variable(&v),
        Comparison::LessThanOrEquals,
        LinearExpression::resource(&reader),
    );
    solver.solve(SOLVER_TASK);
    assert_eq!(solved(&v), Polynomial::new([20.0, -1.0, 3.0]));

    // 20 - t + 3t^2 shifted by 10s is 310 + 59t + 3t^2.
    solver.step(Duration::from_secs(10));
    assert_eq!(solved(&v), Polynomial::new([310.0, 59.0, 3.0]));
}

#[test]
fn resolve_condition_fires_when_a_driver_changes() {
    let mut solver = LinearArcConsistencySolver::new("retrigger");
    let v = solver.variable("v", SelectionPolicy::upper_bound());
    let driver = ResourceCell::auto(Polynomial::constant(10.0));
    let reader = driver.reader();
    solver.declare(
        LinearExpression::variable(&v),
        Comparison::LessThanOrEquals,
        LinearExpression::resource(&reader),
    );
    solver.solve(SOLVER_TASK);

    let condition = solver.resolve_condition();
    assert_eq!(
        condition.evaluate(true, Duration::ZERO, Duration::ZERO, Duration::MAX),
        None
    );
    driver.set(MODEL_TASK, Polynomial::constant(3.0));
    assert_eq!(
        condition.evaluate(true, Duration::ZERO, Duration::ZERO, Duration::MAX),
        Some(Duration::ZERO)
    );
}

#[test]
fn coupled_variables_propagate_through_the_network() {
    // a = driver, b = 2a, c <= a + b; under upper-bound selection the
    // chain settles in one pass.
    let mut solver = LinearArcConsistencySolver::new("network");
    let a = solver.variable("a", SelectionPolicy::upper_bound());
    let b = solver.variable("b", SelectionPolicy::upper_bound());
    let c = solver.variable("c", SelectionPolicy::upper_bound());
    solver.declare(
        LinearExpression::variable(&a),
        Comparison::Equals,
        LinearExpression::constant(3.0),
    );
    solver.declare(
        LinearExpression::variable(&b),
        Comparison::Equals,
        LinearExpression::variable(&a).multiply(2.0),
    );
    solver.declare(
        LinearExpression::variable(&c),
        Comparison::LessThanOrEquals,
        LinearExpression::variable(&a).add(&LinearExpression::variable(&b)),
    );
    solver.solve(SOLVER_TASK);
    assert_eq!(solved(&a), Polynomial::constant(3.0));
    assert_eq!(solved(&b), Polynomial::constant(6.0));
    assert_eq!(solved(&c), Polynomial::constant(9.0));
}

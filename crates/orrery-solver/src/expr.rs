//! Linear expressions over variables and their reduction to directed
//! arc-consistency constraints.
//!
//! Model code declares constraints in the general form
//! `left <cmp> right`. Declaration normalizes both sides into
//! `sum(scale_i * v_i) <cmp> driven`, where `driven` is an ordinary
//! polynomial resource, then standardizes that into one directed
//! constraint per participating variable, solving the expression for
//! that variable in terms of the others.

use crate::polynomial::Polynomial;
use indexmap::IndexMap;
use orrery_core::{expiring, Dynamics, ErrorCatching, Expiring};
use orrery_resource::ops;
use orrery_resource::{constant, ResourceRef};
use std::fmt;
use std::rc::Rc;

/// Index of a variable within its owning solver.
///
/// Indices follow declaration order, which makes them the deterministic
/// tie-break when an under-constrained system must select a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableId(pub(crate) usize);

impl VariableId {
    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One variable's feasible interval during a solve pass.
///
/// Bounds start unbounded and only ever tighten; each bound carries the
/// expiry of the inputs that produced it.
#[derive(Clone, Debug)]
pub struct Domain {
    lower_bound: Expiring<Polynomial>,
    upper_bound: Expiring<Polynomial>,
}

impl Domain {
    pub(crate) fn unbounded() -> Self {
        Domain {
            lower_bound: Expiring::never(Polynomial::constant(f64::NEG_INFINITY)),
            upper_bound: Expiring::never(Polynomial::constant(f64::INFINITY)),
        }
    }

    /// The tightest lower bound established so far.
    pub fn lower_bound(&self) -> &Expiring<Polynomial> {
        &self.lower_bound
    }

    /// The tightest upper bound established so far.
    pub fn upper_bound(&self) -> &Expiring<Polynomial> {
        &self.upper_bound
    }

    /// Tighten the lower bound, keeping the larger of old and new.
    /// Returns whether the bound changed.
    pub(crate) fn restrict_lower(&mut self, new_bound: Expiring<Polynomial>) -> bool {
        let old = self.lower_bound.clone();
        self.lower_bound = old
            .clone()
            .bind(|current| new_bound.bind(|new| current.max(&new)));
        self.lower_bound != old
    }

    /// Tighten the upper bound, keeping the smaller of old and new.
    /// Returns whether the bound changed.
    pub(crate) fn restrict_upper(&mut self, new_bound: Expiring<Polynomial>) -> bool {
        let old = self.upper_bound.clone();
        self.upper_bound = old
            .clone()
            .bind(|current| new_bound.bind(|new| current.min(&new)));
        self.upper_bound != old
    }

    pub(crate) fn collapse_to(&mut self, point: Expiring<Polynomial>) {
        self.lower_bound = point.clone();
        self.upper_bound = point;
    }

    /// True when the bounds have crossed: no value satisfies them.
    pub fn is_empty(&self) -> bool {
        self.lower_bound.data.extract() > self.upper_bound.data.extract()
    }

    /// True until the bounds pin down a single polynomial.
    pub fn is_unsolved(&self) -> bool {
        self.lower_bound.data != self.upper_bound.data
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.lower_bound, self.upper_bound)
    }
}

/// A linear combination of solver variables plus a driven term.
///
/// The driven term is an arbitrary polynomial resource; the variable
/// part maps each participating variable to its scale.
#[derive(Clone)]
pub struct LinearExpression {
    driven: ResourceRef<Polynomial>,
    terms: IndexMap<VariableId, f64>,
}

impl LinearExpression {
    /// A constant expression with no variable part.
    pub fn constant(value: f64) -> Self {
        LinearExpression {
            driven: constant(Polynomial::constant(value)),
            terms: IndexMap::new(),
        }
    }

    /// An expression tracking a polynomial resource, with no variable
    /// part.
    pub fn resource(driven: &ResourceRef<Polynomial>) -> Self {
        LinearExpression {
            driven: driven.clone(),
            terms: IndexMap::new(),
        }
    }

    /// The expression `1.0 * v`.
    pub fn variable(v: &crate::solver::Variable) -> Self {
        let mut terms = IndexMap::new();
        terms.insert(v.id(), 1.0);
        LinearExpression {
            driven: constant(Polynomial::constant(0.0)),
            terms,
        }
    }

    /// Term-wise sum.
    pub fn add(&self, other: &LinearExpression) -> LinearExpression {
        let driven = ops::map2(&self.driven, &other.driven, |a, b| a.add(b));
        let mut terms = self.terms.clone();
        for (v, scale) in &other.terms {
            *terms.entry(*v).or_insert(0.0) += scale;
        }
        terms.retain(|_, scale| *scale != 0.0);
        LinearExpression { driven, terms }
    }

    /// Term-wise difference.
    pub fn subtract(&self, other: &LinearExpression) -> LinearExpression {
        self.add(&other.multiply(-1.0))
    }

    /// Scale the whole expression.
    ///
    /// Scaling by zero yields the constant zero expression with no
    /// dependencies, so vanished terms cannot retrigger solving.
    pub fn multiply(&self, scale: f64) -> LinearExpression {
        if scale == 0.0 {
            return LinearExpression::constant(0.0);
        }
        let driven = ops::map(&self.driven, move |p| p.scale(scale));
        let terms = self.terms.iter().map(|(v, s)| (*v, s * scale)).collect();
        LinearExpression { driven, terms }
    }
}

/// Relation between the two sides of a declared constraint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// `left <= right`.
    LessThanOrEquals,
    /// `left >= right`.
    GreaterThanOrEquals,
    /// `left == right`, decomposed into a `<=` and `>=` pair.
    Equals,
}

/// The inequality directions a standardized constraint can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InequalityComparison {
    /// Constrains the variable's upper bound.
    LessThanOrEquals,
    /// Constrains the variable's lower bound.
    GreaterThanOrEquals,
}

impl InequalityComparison {
    /// The flipped direction, for negative scaling.
    pub fn opposite(self) -> Self {
        match self {
            Self::LessThanOrEquals => Self::GreaterThanOrEquals,
            Self::GreaterThanOrEquals => Self::LessThanOrEquals,
        }
    }
}

impl fmt::Display for InequalityComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LessThanOrEquals => "<=",
            Self::GreaterThanOrEquals => ">=",
        })
    }
}

/// A constraint as model code writes it: two expressions and a relation.
#[derive(Clone)]
pub struct GeneralConstraint {
    left: LinearExpression,
    comparison: Comparison,
    right: LinearExpression,
}

impl GeneralConstraint {
    /// Relate two linear expressions.
    pub fn new(left: LinearExpression, comparison: Comparison, right: LinearExpression) -> Self {
        GeneralConstraint {
            left,
            comparison,
            right,
        }
    }

    /// Collect all variables on the left and all driven terms on the
    /// right: `sum(scale_i * v_i) <cmp> driven`. Zero net scales drop
    /// out entirely.
    pub(crate) fn normalize(&self) -> NormalizedConstraint {
        let driven = ops::map2(&self.right.driven, &self.left.driven, |r, l| r.subtract(l));
        let mut terms = self.left.terms.clone();
        for (v, scale) in &self.right.terms {
            *terms.entry(*v).or_insert(0.0) -= scale;
        }
        terms.retain(|_, scale| *scale != 0.0);
        NormalizedConstraint {
            terms,
            comparison: self.comparison,
            driven,
        }
    }
}

/// `sum(scale_i * v_i) <cmp> driven`, with every zero scale removed.
pub(crate) struct NormalizedConstraint {
    terms: IndexMap<VariableId, f64>,
    comparison: Comparison,
    driven: ResourceRef<Polynomial>,
}

type BoundFn = dyn Fn(&[Domain]) -> ErrorCatching<Expiring<Polynomial>>;

/// A directed edge for arc consistency: one constrained variable, the
/// variables driving it, and a function computing the bound the
/// constrained variable must satisfy given the drivers' domains.
pub(crate) struct DirectionalConstraint {
    pub(crate) constrained: VariableId,
    pub(crate) comparison: InequalityComparison,
    pub(crate) bound: Rc<BoundFn>,
    pub(crate) driving: Vec<VariableId>,
}

impl NormalizedConstraint {
    pub(crate) fn driven(&self) -> &ResourceRef<Polynomial> {
        &self.driven
    }

    /// Solve the normalized form for each participating variable in
    /// turn, producing the directed edges arc consistency runs on.
    ///
    /// For a variable with scale `s`, the bound divides through by `s`;
    /// a negative scale flips the inequality direction.
    pub(crate) fn standardize(&self) -> Vec<DirectionalConstraint> {
        let mut edges = Vec::new();
        for constrained in self.terms.keys().copied() {
            let inverse_scale = 1.0 / self.terms[&constrained];
            let driving: Vec<VariableId> = self
                .terms
                .keys()
                .copied()
                .filter(|v| *v != constrained)
                .collect();
            let comparisons: &[InequalityComparison] = match self.comparison {
                Comparison::LessThanOrEquals => &[InequalityComparison::LessThanOrEquals],
                Comparison::GreaterThanOrEquals => &[InequalityComparison::GreaterThanOrEquals],
                Comparison::Equals => &[
                    InequalityComparison::LessThanOrEquals,
                    InequalityComparison::GreaterThanOrEquals,
                ],
            };
            for &comparison in comparisons {
                edges.push(self.directional_constraint(constrained, comparison, inverse_scale, &driving));
            }
        }
        edges
    }

    fn directional_constraint(
        &self,
        constrained: VariableId,
        comparison: InequalityComparison,
        inverse_scale: f64,
        driving: &[VariableId],
    ) -> DirectionalConstraint {
        let driven = self.driven.clone();
        let terms = self.terms.clone();
        let bound = move |domains: &[Domain]| -> ErrorCatching<Expiring<Polynomial>> {
            // The driven term's expiry is recaptured by re-solving, not
            // carried into the bound. With the common feedback loop from
            // the previous solution, carrying it would re-expire the new
            // solution immediately and loop the solver forever.
            driven.get_dynamics().map(|driven_state| {
                let mut acc = Expiring::never(driven_state.data);
                for (v, &scale) in &terms {
                    if *v == constrained {
                        continue;
                    }
                    let domain = &domains[v.index()];
                    // Moving scale * v to the driven side negates it; the
                    // bounding side depends on the term's sign and the
                    // direction being computed.
                    let use_lower = (scale > 0.0)
                        == (comparison == InequalityComparison::LessThanOrEquals);
                    let driver_bound = if use_lower {
                        domain.lower_bound().clone()
                    } else {
                        domain.upper_bound().clone()
                    };
                    acc = expiring::map2(acc, driver_bound.map(|p| p.scale(-scale)), |a, b| {
                        a.add(&b)
                    });
                }
                acc.map(|p| p.scale(inverse_scale))
            })
        };
        DirectionalConstraint {
            constrained,
            comparison: if inverse_scale > 0.0 {
                comparison
            } else {
                comparison.opposite()
            },
            bound: Rc::new(bound),
            driving: driving.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_resource::current_value;

    fn driven_value(c: &NormalizedConstraint) -> f64 {
        current_value(c.driven()).expect("driven term should evaluate")
    }

    #[test]
    fn normalization_collects_driven_terms_on_the_right() {
        // 3 <= 10 normalizes to an empty variable side with driven 7.
        let c = GeneralConstraint::new(
            LinearExpression::constant(3.0),
            Comparison::LessThanOrEquals,
            LinearExpression::constant(10.0),
        )
        .normalize();
        assert_eq!(driven_value(&c), 7.0);
        assert!(c.terms.is_empty());
    }

    #[test]
    fn cancelled_variables_produce_no_edges() {
        let mut solver = crate::solver::LinearArcConsistencySolver::new("cancel");
        let v = solver.variable("v", crate::solver::SelectionPolicy::upper_bound());
        let lhs = LinearExpression::variable(&v);
        let rhs = LinearExpression::variable(&v).add(&LinearExpression::constant(1.0));
        let c = GeneralConstraint::new(lhs, Comparison::LessThanOrEquals, rhs).normalize();
        assert!(c.terms.is_empty());
        assert!(c.standardize().is_empty());
    }

    #[test]
    fn zero_scaling_drops_dependencies() {
        let mut solver = crate::solver::LinearArcConsistencySolver::new("scale");
        let v = solver.variable("v", crate::solver::SelectionPolicy::upper_bound());
        let scaled = LinearExpression::variable(&v).multiply(0.0);
        assert!(scaled.terms.is_empty());
    }

    #[test]
    fn negative_scale_flips_the_edge_direction() {
        let mut solver = crate::solver::LinearArcConsistencySolver::new("flip");
        let v = solver.variable("v", crate::solver::SelectionPolicy::upper_bound());
        // -v <= -5 constrains v from below.
        let c = GeneralConstraint::new(
            LinearExpression::variable(&v).multiply(-1.0),
            Comparison::LessThanOrEquals,
            LinearExpression::constant(-5.0),
        )
        .normalize();
        let edges = c.standardize();
        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges[0].comparison,
            InequalityComparison::GreaterThanOrEquals
        );
        let bound = (edges[0].bound)(&[Domain::unbounded()])
            .into_result()
            .expect("bound should evaluate");
        assert_eq!(bound.data, Polynomial::constant(5.0));
    }

    #[test]
    fn equality_decomposes_into_two_edges() {
        let mut solver = crate::solver::LinearArcConsistencySolver::new("eq");
        let v = solver.variable("v", crate::solver::SelectionPolicy::upper_bound());
        let c = GeneralConstraint::new(
            LinearExpression::variable(&v),
            Comparison::Equals,
            LinearExpression::constant(2.0),
        )
        .normalize();
        let directions: Vec<_> = c.standardize().iter().map(|e| e.comparison).collect();
        assert_eq!(
            directions,
            [
                InequalityComparison::LessThanOrEquals,
                InequalityComparison::GreaterThanOrEquals
            ]
        );
    }
}

//! Orrery: reactive state cells, expiring dynamics, and linear
//! constraint solving for discrete-event simulation.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all Orrery sub-crates. For most users, adding `orrery` as a
//! single dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use orrery::prelude::*;
//!
//! // A counter cell whose concurrent effects are checked for
//! // commutativity, and a resource derived from it.
//! let counter = ResourceCell::auto(Discrete::new(0i64));
//! let doubled = orrery::resource::ops::map(&counter.reader(), |Discrete(n)| {
//!     Discrete::new(n * 2)
//! });
//!
//! // Two tasks increment at the same instant; increments commute, so
//! // the auto trait accepts both.
//! let increment = || DynamicsEffect::of("increment", |Discrete(n)| Discrete::new(n + 1));
//! counter.emit(TaskId(0), increment());
//! counter.emit(TaskId(1), increment());
//! assert_eq!(current_value(&doubled).unwrap(), 4);
//!
//! // Resolve a constraint network: v <= 10, v >= 0, taking the upper
//! // bound when under-constrained.
//! let mut solver = LinearArcConsistencySolver::new("quick start");
//! let v = solver.variable("v", SelectionPolicy::upper_bound());
//! solver.declare(
//!     LinearExpression::variable(&v),
//!     Comparison::LessThanOrEquals,
//!     LinearExpression::constant(10.0),
//! );
//! solver.declare(
//!     LinearExpression::variable(&v),
//!     Comparison::GreaterThanOrEquals,
//!     LinearExpression::constant(0.0),
//! );
//! solver.solve(TaskId(2));
//! assert_eq!(current_value(&v.resource()).unwrap(), 10.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `orrery-core` | Dynamics, expiry, errors, time, ids |
//! | [`cell`] | `orrery-cell` | State cells and the effect algebra |
//! | [`resource`] | `orrery-resource` | Resources, derivation, conditions |
//! | [`solver`] | `orrery-solver` | Polynomials and arc-consistency solving |
//! | [`obs`] | `orrery-obs` | Telemetry sampling |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core value types (`orrery-core`).
///
/// The [`types::Dynamics`] trait, [`types::Expiring`] values and their
/// [`types::Expiry`] horizons, the [`types::ErrorCatching`] state
/// wrapper, simulated [`types::Duration`], and identifier newtypes.
pub use orrery_core as types;

/// State cells and the effect algebra (`orrery-cell`).
///
/// [`cell::Cell`] holds dynamics evolving through simulated time;
/// [`cell::DynamicsEffect`] and [`cell::EffectTrait`] define how
/// sequential and concurrent effects combine.
pub use orrery_cell as cell;

/// Pull-based resources and derivation (`orrery-resource`).
///
/// The [`resource::Resource`] capability, the writable
/// [`resource::ResourceCell`], monadic combinators in [`resource::ops`],
/// and scheduler-boundary [`resource::Condition`] values.
pub use orrery_resource as resource;

/// Polynomials and linear constraint solving (`orrery-solver`).
///
/// Declare [`solver::Variable`]s and linear constraints on a
/// [`solver::LinearArcConsistencySolver`]; each solve pass emits a
/// consistent assignment into every variable's cell.
pub use orrery_solver as solver;

/// Telemetry sampling (`orrery-obs`).
///
/// Register resources with an [`obs::Registrar`] and extract
/// [`obs::Sample`] records of their current values and expiries.
pub use orrery_obs as obs;

/// Common imports for typical Orrery usage.
///
/// ```rust
/// use orrery::prelude::*;
/// ```
pub mod prelude {
    // Core values
    pub use orrery_core::{
        Clock, Discrete, Duration, Dynamics, ErrorCatching, Expiring, Expiry, SimError, SourceId,
        TaskId, Unstructured,
    };

    // Cells and effects
    pub use orrery_cell::{Cell, DynamicsEffect, EffectTrait};

    // Resources
    pub use orrery_resource::{
        constant, current_data, current_value, from_fn, CachedResource, Condition, Resource,
        ResourceCell, ResourceRef,
    };

    // Solver
    pub use orrery_solver::{
        Comparison, LinearArcConsistencySolver, LinearExpression, Polynomial, SelectionPolicy,
        Variable,
    };

    // Telemetry
    pub use orrery_obs::{Registrar, Sample, SampleValue};
}

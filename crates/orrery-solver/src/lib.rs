//! Linear constraint resolution over polynomial resources.
//!
//! Variables are polynomial-valued resources owned by a
//! [`LinearArcConsistencySolver`]; constraints relate linear
//! combinations of variables to time-varying driven terms. Each solve
//! pass narrows per-variable domains by directional arc consistency and
//! emits a consistent assignment (or an infeasibility failure) into
//! every variable's cell.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod expr;
pub mod polynomial;
pub mod solver;

pub use expr::{Comparison, Domain, GeneralConstraint, LinearExpression, VariableId};
pub use polynomial::Polynomial;
pub use solver::{LinearArcConsistencySolver, SelectionPolicy, Variable};

//! Failure values and the error-catching state wrapper.
//!
//! Failures inside the resource layer are data, not control flow: they
//! are stored in cells, propagated through derivations, and compared
//! for equivalence. [`SimError`] is therefore `Clone + PartialEq`, and
//! the error enums are written by hand with `Display`/`Error` impls.

use std::error::Error;
use std::fmt;

/// A localized simulation failure.
///
/// A `SimError` marks one cell or derivation as failing; the rest of
/// the simulation continues undisturbed. Recovery is automatic: the
/// failure clears as soon as a later computation on the same state
/// succeeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// Concurrent effects landed on a cell whose trait forbids any
    /// concurrency. Signals a modeling bug.
    ConcurrentEffectsForbidden {
        /// Name of the first effect.
        left: String,
        /// Name of the second effect.
        right: String,
    },
    /// The auto trait applied two concurrent effects in both orders and
    /// the results disagreed. Signals silent nondeterminism, converted
    /// to a loud, localized failure.
    NonCommutingEffects {
        /// Name of the first effect.
        left: String,
        /// Name of the second effect.
        right: String,
    },
    /// A derivation (effect body or derived-resource computation)
    /// reported an error. Recoverable once the cause clears.
    DerivationFailure {
        /// Human-readable description of the failure.
        reason: String,
    },
    /// A constraint solve produced an empty domain for a variable.
    Infeasible {
        /// Name of the solver that failed.
        solver: String,
        /// Name of the variable whose domain emptied.
        variable: String,
        /// Rendering of the domain's lower bound.
        lower: String,
        /// Rendering of the domain's upper bound.
        upper: String,
    },
}

impl SimError {
    /// Convenience constructor for [`SimError::DerivationFailure`].
    pub fn derivation(reason: impl Into<String>) -> Self {
        SimError::DerivationFailure {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConcurrentEffectsForbidden { left, right } => {
                write!(
                    f,
                    "concurrent effects are not supported on this resource: ({left}) and ({right})"
                )
            }
            Self::NonCommutingEffects { left, right } => {
                write!(
                    f,
                    "detected non-commuting concurrent effects: ({left}) and ({right})"
                )
            }
            Self::DerivationFailure { reason } => write!(f, "derivation failed: {reason}"),
            Self::Infeasible {
                solver,
                variable,
                lower,
                upper,
            } => write!(
                f,
                "solver '{solver}' failed: domain for '{variable}' is empty: [{lower}, {upper}]"
            ),
        }
    }
}

impl Error for SimError {}

/// A computation outcome: either a value or a [`SimError`].
///
/// Unlike `Result` in transient call positions, `ErrorCatching` is a
/// *stored* state: a cell or derivation holds one of these between
/// reads, and a `Failure` persists until a later `Success` overwrites
/// it. Failures never silently disappear except by such recovery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorCatching<T> {
    /// The computation succeeded.
    Success(T),
    /// The computation failed with the contained cause.
    Failure(SimError),
}

impl<T> ErrorCatching<T> {
    /// Transform a success value, passing failures through untouched.
    pub fn map<B>(self, f: impl FnOnce(T) -> B) -> ErrorCatching<B> {
        match self {
            Self::Success(v) => ErrorCatching::Success(f(v)),
            Self::Failure(e) => ErrorCatching::Failure(e),
        }
    }

    /// Monadic bind: first failure wins.
    pub fn and_then<B>(self, f: impl FnOnce(T) -> ErrorCatching<B>) -> ErrorCatching<B> {
        match self {
            Self::Success(v) => f(v),
            Self::Failure(e) => ErrorCatching::Failure(e),
        }
    }

    /// Fold both variants into a single result.
    pub fn match_with<R>(
        self,
        on_success: impl FnOnce(T) -> R,
        on_failure: impl FnOnce(SimError) -> R,
    ) -> R {
        match self {
            Self::Success(v) => on_success(v),
            Self::Failure(e) => on_failure(e),
        }
    }

    /// Borrowing view of the success value, if any.
    pub fn success(&self) -> Option<&T> {
        match self {
            Self::Success(v) => Some(v),
            Self::Failure(_) => None,
        }
    }

    /// Borrowing view of the failure cause, if any.
    pub fn failure(&self) -> Option<&SimError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }

    /// True if this outcome is a failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Convert to a `Result` at the point a concrete value is needed.
    pub fn into_result(self) -> Result<T, SimError> {
        match self {
            Self::Success(v) => Ok(v),
            Self::Failure(e) => Err(e),
        }
    }

    /// The success value, or `fallback` on failure.
    pub fn unwrap_or(self, fallback: T) -> T {
        match self {
            Self::Success(v) => v,
            Self::Failure(_) => fallback,
        }
    }

    /// Borrowing map.
    pub fn as_ref(&self) -> ErrorCatching<&T> {
        match self {
            Self::Success(v) => ErrorCatching::Success(v),
            Self::Failure(e) => ErrorCatching::Failure(e.clone()),
        }
    }
}

/// Combine two outcomes; the first failure wins.
pub fn map2<A, B, C>(
    a: ErrorCatching<A>,
    b: ErrorCatching<B>,
    f: impl FnOnce(A, B) -> C,
) -> ErrorCatching<C> {
    a.and_then(|a| b.map(|b| f(a, b)))
}

impl<T> From<Result<T, SimError>> for ErrorCatching<T> {
    fn from(r: Result<T, SimError>) -> Self {
        match r {
            Ok(v) => Self::Success(v),
            Err(e) => Self::Failure(e),
        }
    }
}

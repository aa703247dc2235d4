//! Core types for the Orrery simulation framework.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! logical time ([`Duration`]), validity horizons ([`Expiry`],
//! [`Expiring`]), the [`Dynamics`] trait with its canonical
//! implementations, the [`ErrorCatching`] success/failure wrapper, and
//! strongly-typed identifiers.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod dynamics;
pub mod error;
pub mod expiring;
pub mod expiry;
pub mod id;
pub mod time;
pub mod unstructured;

pub use dynamics::{Clock, Discrete, Dynamics};
pub use error::{ErrorCatching, SimError};
pub use expiring::Expiring;
pub use expiry::Expiry;
pub use id::{SourceId, TaskId};
pub use time::Duration;
pub use unstructured::Unstructured;

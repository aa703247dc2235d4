//! Pull-based resource derivation and error propagation.
//!
//! A [`Resource`] is a read-only capability yielding a possibly-failing,
//! possibly-expiring dynamics, recomputed on every read. The writable
//! specialization [`ResourceCell`] is backed by exactly one owned cell.
//! Derivations compose through the monadic combinators in [`ops`],
//! which enforce the expiry min-law and first-failure-wins propagation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell_resource;
pub mod condition;
pub mod naming;
pub mod ops;
pub mod react;
pub mod resource;

pub use cell_resource::ResourceCell;
pub use condition::{dynamics_change, expires, Condition};
pub use naming::NameRegistry;
pub use react::{CachedResource, SignallingResource};
pub use resource::{
    constant, current_data, current_value, from_fn, value_or, Resource, ResourceRef,
};

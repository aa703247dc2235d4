//! Single-writer state cells and the effect algebra.
//!
//! A [`Cell`] is the sole addressable unit of mutable simulation state.
//! It is never written directly: tasks emit [`DynamicsEffect`]s, and the
//! cell's [`EffectTrait`] decides how same-instant effects combine —
//! sequentially along one task's program order, and through a
//! concurrency-resolution policy across tasks.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod effect;

pub use cell::Cell;
pub use effect::{DynamicsEffect, EffectTrait};

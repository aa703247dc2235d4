//! Test utilities and fixtures for Orrery development.
//!
//! Provides a simple non-constant [`Ramp`] dynamics, canned resources
//! with fixed expiries or failures, and reusable effects for exercising
//! cells and effect traits in tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{add, expiring_resource, fail, failing_resource, Ramp};

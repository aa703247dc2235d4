//! Telemetry sampling of Orrery resources.
//!
//! A [`Registrar`] holds read-only handles to resources of interest and
//! extracts their current values and expiries into [`Sample`] records,
//! optionally forwarding them over a channel. It is a pure consumer of
//! the resource layer and never mutates simulation state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod registrar;
pub mod sample;

pub use registrar::Registrar;
pub use sample::{Sample, SampleValue};

//! Sample records emitted by the registrar.

use orrery_core::{Duration, ErrorCatching, Expiry, SourceId};
use std::fmt;

/// A telemetry-friendly scalar extracted from a resource.
#[derive(Clone, Debug, PartialEq)]
pub enum SampleValue {
    /// A floating-point quantity.
    Float(f64),
    /// An integer quantity.
    Integer(i64),
    /// A boolean flag.
    Boolean(bool),
    /// A simulated duration.
    Duration(Duration),
    /// Free-form text.
    Text(String),
}

impl From<f64> for SampleValue {
    fn from(v: f64) -> Self {
        SampleValue::Float(v)
    }
}

impl From<i64> for SampleValue {
    fn from(v: i64) -> Self {
        SampleValue::Integer(v)
    }
}

impl From<bool> for SampleValue {
    fn from(v: bool) -> Self {
        SampleValue::Boolean(v)
    }
}

impl From<Duration> for SampleValue {
    fn from(v: Duration) -> Self {
        SampleValue::Duration(v)
    }
}

impl From<String> for SampleValue {
    fn from(v: String) -> Self {
        SampleValue::Text(v)
    }
}

impl fmt::Display for SampleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SampleValue::Float(v) => write!(f, "{v}"),
            SampleValue::Integer(v) => write!(f, "{v}"),
            SampleValue::Boolean(v) => write!(f, "{v}"),
            SampleValue::Duration(v) => write!(f, "{v}"),
            SampleValue::Text(v) => f.write_str(v),
        }
    }
}

/// One observation of one registered resource.
///
/// A failing resource reports its failure in every sample until the
/// failure clears; sampling never mutates the resource.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    /// Registration id of the sampled resource.
    pub source: SourceId,
    /// Name the resource was registered under.
    pub name: String,
    /// The extracted value, or the resource's current failure.
    pub value: ErrorCatching<SampleValue>,
    /// Validity horizon of the sampled dynamics. [`Expiry::NEVER`] for
    /// failing resources.
    pub expiry: Expiry,
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            ErrorCatching::Success(value) => {
                write!(f, "{} = {} ({})", self.name, value, self.expiry)
            }
            ErrorCatching::Failure(error) => write!(f, "{} failed: {}", self.name, error),
        }
    }
}

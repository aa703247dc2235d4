//! Human-readable names for resources.
//!
//! Resources and cells are anonymous closures and ids at runtime; this
//! registry maps stable [`SourceId`]s to the names model code registered
//! them under, for logs, samples, and error reports.

use indexmap::IndexMap;
use orrery_core::SourceId;

/// A registry of display names keyed by stable source id.
///
/// Iteration order is registration order.
#[derive(Debug, Default)]
pub struct NameRegistry {
    names: IndexMap<SourceId, String>,
}

impl NameRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or rename) a source.
    pub fn register(&mut self, id: SourceId, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    /// The registered name, if any.
    pub fn name_of(&self, id: SourceId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// The registered name, or a placeholder built from the id.
    pub fn name_or_id(&self, id: SourceId) -> String {
        match self.name_of(id) {
            Some(name) => name.to_string(),
            None => format!("<{id}>"),
        }
    }

    /// Remove a source's name, returning it if present.
    pub fn unregister(&mut self, id: SourceId) -> Option<String> {
        self.names.shift_remove(&id)
    }

    /// All registered sources, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (SourceId, &str)> {
        self.names.iter().map(|(id, name)| (*id, name.as_str()))
    }

    /// Number of registered sources.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

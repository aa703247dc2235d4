//! The telemetry registrar.

use crate::sample::{Sample, SampleValue};
use crossbeam_channel::Sender;
use indexmap::IndexMap;
use orrery_core::{Dynamics, ErrorCatching, Expiry, SourceId};
use orrery_resource::{NameRegistry, ResourceRef};

trait Sampler {
    fn sample(&self) -> (ErrorCatching<SampleValue>, Expiry);
}

struct ResourceSampler<D: Dynamics, F> {
    resource: ResourceRef<D>,
    convert: F,
}

impl<D, F> Sampler for ResourceSampler<D, F>
where
    D: Dynamics,
    F: Fn(D::Value) -> SampleValue,
{
    fn sample(&self) -> (ErrorCatching<SampleValue>, Expiry) {
        match self.resource.get_dynamics() {
            ErrorCatching::Success(state) => {
                let expiry = state.expiry;
                (
                    ErrorCatching::Success((self.convert)(state.data.extract())),
                    expiry,
                )
            }
            ErrorCatching::Failure(error) => (ErrorCatching::Failure(error), Expiry::NEVER),
        }
    }
}

/// Registers resources for sampling and extracts their current values.
///
/// A pure consumer: sampling reads each resource once and performs no
/// mutation. Samples can additionally be forwarded over a channel to an
/// out-of-thread recorder.
#[derive(Default)]
pub struct Registrar {
    names: NameRegistry,
    samplers: IndexMap<SourceId, Box<dyn Sampler>>,
    sink: Option<Sender<Sample>>,
}

impl Registrar {
    /// An empty registrar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward every sample taken by [`Registrar::sample_all`] to
    /// `sink` as well. A disconnected receiver is ignored.
    pub fn set_sink(&mut self, sink: Sender<Sample>) {
        self.sink = Some(sink);
    }

    /// Register a resource whose extracted value converts directly into
    /// a [`SampleValue`]. Returns the registration id.
    pub fn register<D>(&mut self, name: impl Into<String>, resource: &ResourceRef<D>) -> SourceId
    where
        D: Dynamics,
        D::Value: Into<SampleValue>,
    {
        self.register_with(name, resource, Into::into)
    }

    /// Register a resource with an explicit value conversion.
    pub fn register_with<D: Dynamics>(
        &mut self,
        name: impl Into<String>,
        resource: &ResourceRef<D>,
        convert: impl Fn(D::Value) -> SampleValue + 'static,
    ) -> SourceId {
        let id = SourceId::next();
        self.names.register(id, name);
        self.samplers.insert(
            id,
            Box::new(ResourceSampler {
                resource: resource.clone(),
                convert,
            }),
        );
        id
    }

    /// Remove a registration.
    pub fn unregister(&mut self, id: SourceId) {
        self.names.unregister(id);
        self.samplers.shift_remove(&id);
    }

    /// Sample one registered resource.
    pub fn sample(&self, id: SourceId) -> Option<Sample> {
        let sampler = self.samplers.get(&id)?;
        let (value, expiry) = sampler.sample();
        Some(Sample {
            source: id,
            name: self.names.name_or_id(id),
            value,
            expiry,
        })
    }

    /// Sample every registered resource, in registration order, and
    /// forward each sample to the sink if one is set.
    pub fn sample_all(&self) -> Vec<Sample> {
        let samples: Vec<Sample> = self
            .samplers
            .keys()
            .filter_map(|id| self.sample(*id))
            .collect();
        if let Some(sink) = &self.sink {
            for sample in &samples {
                let _ = sink.send(sample.clone());
            }
        }
        samples
    }

    /// The registered names.
    pub fn names(&self) -> &NameRegistry {
        &self.names
    }

    /// Number of registered resources.
    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }
}

//! Eagerly built ("retained") data sources.

use smallvec::SmallVec;
use std::sync::{Arc, OnceLock};

use super::{
    ContainerDataSource, ContainerHandle, DataSource, SampledDataSource, SampledHandle,
    VectorDataSource, VectorHandle,
};
use crate::util::{Time, Token, Value};

/// A container holding its children directly.
///
/// Children keep insertion order; a repeated name replaces the earlier
/// child.
#[derive(Clone, Default)]
pub struct RetainedContainerDataSource {
    entries: SmallVec<[(Token, DataSource); 8]>,
}

impl RetainedContainerDataSource {
    /// Build a container handle from `(name, child)` pairs.
    pub fn new<I, N>(entries: I) -> ContainerHandle
    where
        I: IntoIterator<Item = (N, DataSource)>,
        N: Into<Token>,
    {
        let mut out = Self::default();
        for (name, child) in entries {
            out.insert(name.into(), child);
        }
        Arc::new(out)
    }

    /// An empty container.
    pub fn empty() -> ContainerHandle {
        Arc::new(Self::default())
    }

    fn insert(&mut self, name: Token, child: DataSource) {
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = child;
        } else {
            self.entries.push((name, child));
        }
    }
}

impl ContainerDataSource for RetainedContainerDataSource {
    fn names(&self) -> Vec<Token> {
        self.entries.iter().map(|(n, _)| n.clone()).collect()
    }

    fn get(&self, name: &Token) -> Option<DataSource> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, ds)| ds.clone())
    }
}

/// A constant sampled value.
#[derive(Clone, Debug)]
pub struct RetainedSampledDataSource {
    value: Value,
}

impl RetainedSampledDataSource {
    pub fn new(value: impl Into<Value>) -> SampledHandle {
        Arc::new(Self {
            value: value.into(),
        })
    }
}

impl SampledDataSource for RetainedSampledDataSource {
    fn value(&self, _shutter_offset: Time) -> Value {
        self.value.clone()
    }
}

/// A value with explicit time samples and held interpolation.
///
/// Before the first sample the first value is returned.
#[derive(Clone, Debug)]
pub struct RetainedTimeSampledDataSource {
    samples: Vec<(Time, Value)>,
}

impl RetainedTimeSampledDataSource {
    /// Build from `(time, value)` samples in any order.
    pub fn new(samples: impl IntoIterator<Item = (Time, Value)>) -> SampledHandle {
        let mut samples: Vec<_> = samples.into_iter().collect();
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        Arc::new(Self { samples })
    }
}

impl SampledDataSource for RetainedTimeSampledDataSource {
    fn value(&self, shutter_offset: Time) -> Value {
        let idx = self.samples.partition_point(|(t, _)| *t <= shutter_offset);
        match idx {
            0 => self.samples.first().map(|(_, v)| v.clone()).unwrap_or_default(),
            n => self.samples[n - 1].1.clone(),
        }
    }

    fn contributing_sample_times(&self, start: Time, end: Time) -> Option<Vec<Time>> {
        if self.samples.len() < 2 {
            return None;
        }
        // Include the bracketing samples just outside the interval.
        let first = self.samples.partition_point(|(t, _)| *t <= start).saturating_sub(1);
        let last = self.samples.partition_point(|(t, _)| *t < end).min(self.samples.len() - 1);
        Some(self.samples[first..=last].iter().map(|(t, _)| *t).collect())
    }
}

/// A short vector of data sources.
#[derive(Clone, Default)]
pub struct RetainedSmallVectorDataSource {
    elements: SmallVec<[DataSource; 4]>,
}

impl RetainedSmallVectorDataSource {
    pub fn new(elements: impl IntoIterator<Item = DataSource>) -> VectorHandle {
        Arc::new(Self {
            elements: elements.into_iter().collect(),
        })
    }
}

impl VectorDataSource for RetainedSmallVectorDataSource {
    fn len(&self) -> usize {
        self.elements.len()
    }

    fn element(&self, index: usize) -> Option<DataSource> {
        self.elements.get(index).cloned()
    }
}

/// Wrap a value in a constant sampled data source.
pub fn retained_value(value: impl Into<Value>) -> DataSource {
    DataSource::Sampled(RetainedSampledDataSource::new(value))
}

/// Shared boolean data sources.
///
/// Every call with the same argument returns the same node.
pub fn retained_bool(value: bool) -> DataSource {
    static TRUE: OnceLock<SampledHandle> = OnceLock::new();
    static FALSE: OnceLock<SampledHandle> = OnceLock::new();
    let cell = if value { &TRUE } else { &FALSE };
    DataSource::Sampled(
        cell.get_or_init(|| RetainedSampledDataSource::new(value))
            .clone(),
    )
}

/// Wrap `(name, child)` pairs as a container data source.
pub fn retained_container<I, N>(entries: I) -> DataSource
where
    I: IntoIterator<Item = (N, DataSource)>,
    N: Into<Token>,
{
    DataSource::Container(RetainedContainerDataSource::new(entries))
}

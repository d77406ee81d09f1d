//! Data source traits and the shared handle type.
//!
//! A prim's data is a tree of immutable data sources. Interior nodes are
//! containers (named children), leaves are sampled values, and small
//! ordered lists are vectors. Every node is shared through an `Arc` and
//! never mutated after it is published, so composed trees freely reuse
//! sub-trees of their inputs.

use std::sync::Arc;

use super::DataSourceLocator;
use crate::util::{Time, Token, Value, ValueType};

/// A node mapping names to child data sources.
pub trait ContainerDataSource: Send + Sync {
    /// Child names. Order is implementation defined but stable.
    fn names(&self) -> Vec<Token>;

    /// Child for `name`, or `None` if absent.
    fn get(&self, name: &Token) -> Option<DataSource>;
}

/// A leaf holding a possibly time-varying value.
pub trait SampledDataSource: Send + Sync {
    /// Value at a shutter-relative time.
    fn value(&self, shutter_offset: Time) -> Value;

    /// Sample times in `[start, end]` that contribute to the value over the
    /// interval. `None` means the value does not vary.
    fn contributing_sample_times(&self, _start: Time, _end: Time) -> Option<Vec<Time>> {
        None
    }
}

/// An ordered list of child data sources.
pub trait VectorDataSource: Send + Sync {
    fn len(&self) -> usize;

    /// Element at `index`, or `None` when out of range.
    fn element(&self, index: usize) -> Option<DataSource>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shared container handle.
pub type ContainerHandle = Arc<dyn ContainerDataSource>;
/// Shared sampled-value handle.
pub type SampledHandle = Arc<dyn SampledDataSource>;
/// Shared vector handle.
pub type VectorHandle = Arc<dyn VectorDataSource>;

/// Any data source node.
#[derive(Clone)]
pub enum DataSource {
    Container(ContainerHandle),
    Sampled(SampledHandle),
    Vector(VectorHandle),
}

impl DataSource {
    /// Get as a container.
    pub fn as_container(&self) -> Option<&ContainerHandle> {
        match self {
            DataSource::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Get as a sampled leaf.
    pub fn as_sampled(&self) -> Option<&SampledHandle> {
        match self {
            DataSource::Sampled(s) => Some(s),
            _ => None,
        }
    }

    /// Get as a vector.
    pub fn as_vector(&self) -> Option<&VectorHandle> {
        match self {
            DataSource::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Convert into a container handle.
    pub fn into_container(self) -> Option<ContainerHandle> {
        match self {
            DataSource::Container(c) => Some(c),
            _ => None,
        }
    }

    /// Value at time zero for sampled leaves.
    pub fn value(&self) -> Option<Value> {
        self.as_sampled().map(|s| s.value(0.0))
    }

    /// Typed value at time zero for sampled leaves.
    pub fn typed_value<T: ValueType>(&self) -> Option<T> {
        self.value().and_then(|v| T::from_value(&v))
    }

    /// Node kind name, for debugging.
    pub fn kind(&self) -> &'static str {
        match self {
            DataSource::Container(_) => "container",
            DataSource::Sampled(_) => "sampled",
            DataSource::Vector(_) => "vector",
        }
    }

    /// Identity comparison: true when both handles share one node.
    pub fn ptr_eq(&self, other: &DataSource) -> bool {
        match (self, other) {
            (DataSource::Container(a), DataSource::Container(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (DataSource::Sampled(a), DataSource::Sampled(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            (DataSource::Vector(a), DataSource::Vector(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl From<ContainerHandle> for DataSource {
    fn from(c: ContainerHandle) -> Self {
        DataSource::Container(c)
    }
}

impl From<SampledHandle> for DataSource {
    fn from(s: SampledHandle) -> Self {
        DataSource::Sampled(s)
    }
}

impl From<VectorHandle> for DataSource {
    fn from(v: VectorHandle) -> Self {
        DataSource::Vector(v)
    }
}

/// Identity comparison of two optional containers.
pub fn container_ptr_eq(a: Option<&ContainerHandle>, b: Option<&ContainerHandle>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b)),
        (None, None) => true,
        _ => false,
    }
}

/// Resolve a locator inside a container.
///
/// The empty locator resolves to the container itself. Returns `None` when
/// any element is missing or a non-container is reached with elements
/// remaining.
pub fn resolve(container: &ContainerHandle, locator: &DataSourceLocator) -> Option<DataSource> {
    let mut current = DataSource::Container(container.clone());
    for name in locator.elements() {
        current = current.as_container()?.get(name)?;
    }
    Some(current)
}

/// Resolve a locator to a container.
pub fn resolve_container(
    container: &ContainerHandle,
    locator: &DataSourceLocator,
) -> Option<ContainerHandle> {
    resolve(container, locator).and_then(DataSource::into_container)
}

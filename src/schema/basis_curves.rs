//! Basis curves schema.

use super::{container_child, typed_child, Schema};
use crate::core::{
    retained_value, ContainerHandle, DataSource, DataSourceLocator, RetainedContainerDataSource,
};
use crate::util::Token;

pub const BASIS_CURVES: &str = "basisCurves";
pub const CURVES_TOPOLOGY: &str = "topology";
pub const CURVE_VERTEX_COUNTS: &str = "curveVertexCounts";
pub const CURVE_INDICES: &str = "curveIndices";
pub const BASIS: &str = "basis";
pub const CURVE_TYPE: &str = "type";
pub const WRAP: &str = "wrap";

/// Curve basis, type and wrap tokens.
pub mod curve_tokens {
    pub const BEZIER: &str = "bezier";
    pub const BSPLINE: &str = "bspline";
    pub const CATMULL_ROM: &str = "catmullRom";

    pub const LINEAR: &str = "linear";
    pub const CUBIC: &str = "cubic";

    pub const NONPERIODIC: &str = "nonperiodic";
    pub const PERIODIC: &str = "periodic";
    pub const PINNED: &str = "pinned";
}

/// View over a prim's `basisCurves` container.
#[derive(Clone)]
pub struct BasisCurvesSchema {
    container: ContainerHandle,
}

impl BasisCurvesSchema {
    pub fn topology(&self) -> Option<BasisCurvesTopologySchema> {
        container_child(&self.container, CURVES_TOPOLOGY)
            .map(|container| BasisCurvesTopologySchema { container })
    }

    pub fn topology_locator() -> DataSourceLocator {
        DataSourceLocator::new([BASIS_CURVES, CURVES_TOPOLOGY])
    }

    pub fn build_retained(topology: ContainerHandle) -> ContainerHandle {
        RetainedContainerDataSource::new([(CURVES_TOPOLOGY, DataSource::Container(topology))])
    }
}

impl Schema for BasisCurvesSchema {
    const SCHEMA_TOKEN: &'static str = BASIS_CURVES;

    fn from_container(container: ContainerHandle) -> Self {
        Self { container }
    }

    fn container(&self) -> &ContainerHandle {
        &self.container
    }
}

/// View over `basisCurves.topology`.
#[derive(Clone)]
pub struct BasisCurvesTopologySchema {
    container: ContainerHandle,
}

impl BasisCurvesTopologySchema {
    pub fn from_container(container: ContainerHandle) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &ContainerHandle {
        &self.container
    }

    pub fn curve_vertex_counts(&self) -> Option<Vec<i32>> {
        typed_child(&self.container, CURVE_VERTEX_COUNTS)
    }

    /// Curve indices; an empty array means "not authored".
    pub fn curve_indices(&self) -> Option<Vec<i32>> {
        typed_child(&self.container, CURVE_INDICES)
    }

    pub fn basis(&self) -> Option<Token> {
        typed_child(&self.container, BASIS)
    }

    pub fn curve_type(&self) -> Option<Token> {
        typed_child(&self.container, CURVE_TYPE)
    }

    pub fn wrap(&self) -> Option<Token> {
        typed_child(&self.container, WRAP)
    }
}

/// Builds a `basisCurves.topology` container.
#[derive(Default)]
pub struct BasisCurvesTopologyBuilder {
    curve_vertex_counts: Vec<i32>,
    curve_indices: Vec<i32>,
    basis: Option<Token>,
    curve_type: Option<Token>,
    wrap: Option<Token>,
}

impl BasisCurvesTopologyBuilder {
    pub fn new(curve_vertex_counts: Vec<i32>) -> Self {
        Self {
            curve_vertex_counts,
            ..Self::default()
        }
    }

    pub fn curve_indices(mut self, indices: Vec<i32>) -> Self {
        self.curve_indices = indices;
        self
    }

    pub fn basis(mut self, basis: impl Into<Token>) -> Self {
        self.basis = Some(basis.into());
        self
    }

    pub fn curve_type(mut self, curve_type: impl Into<Token>) -> Self {
        self.curve_type = Some(curve_type.into());
        self
    }

    pub fn wrap(mut self, wrap: impl Into<Token>) -> Self {
        self.wrap = Some(wrap.into());
        self
    }

    /// Build the container. Curve indices are always present, possibly
    /// as an empty array.
    pub fn build(self) -> ContainerHandle {
        let mut entries = vec![
            (CURVE_VERTEX_COUNTS, retained_value(self.curve_vertex_counts)),
            (CURVE_INDICES, retained_value(self.curve_indices)),
        ];
        if let Some(basis) = self.basis {
            entries.push((BASIS, retained_value(basis)));
        }
        if let Some(curve_type) = self.curve_type {
            entries.push((CURVE_TYPE, retained_value(curve_type)));
        }
        if let Some(wrap) = self.wrap {
            entries.push((WRAP, retained_value(wrap)));
        }
        RetainedContainerDataSource::new(entries)
    }
}

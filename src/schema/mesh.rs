//! Mesh schema.

use super::{container_child, typed_child, Schema};
use crate::core::{
    retained_bool, retained_value, ContainerHandle, DataSource, DataSourceLocator,
    RetainedContainerDataSource,
};
use crate::util::Token;

pub const MESH: &str = "mesh";
pub const TOPOLOGY: &str = "topology";
pub const FACE_VERTEX_COUNTS: &str = "faceVertexCounts";
pub const FACE_VERTEX_INDICES: &str = "faceVertexIndices";
pub const ORIENTATION: &str = "orientation";
pub const SUBDIVISION_SCHEME: &str = "subdivisionScheme";
pub const DOUBLE_SIDED: &str = "doubleSided";

/// View over a prim's `mesh` container.
#[derive(Clone)]
pub struct MeshSchema {
    container: ContainerHandle,
}

impl MeshSchema {
    pub fn topology(&self) -> Option<MeshTopologySchema> {
        container_child(&self.container, TOPOLOGY).map(|container| MeshTopologySchema { container })
    }

    pub fn subdivision_scheme(&self) -> Option<Token> {
        typed_child(&self.container, SUBDIVISION_SCHEME)
    }

    pub fn double_sided(&self) -> bool {
        typed_child(&self.container, DOUBLE_SIDED).unwrap_or(false)
    }

    pub fn topology_locator() -> DataSourceLocator {
        DataSourceLocator::new([MESH, TOPOLOGY])
    }

    pub fn double_sided_locator() -> DataSourceLocator {
        DataSourceLocator::new([MESH, DOUBLE_SIDED])
    }

    pub fn build_retained(
        topology: ContainerHandle,
        subdivision_scheme: Option<Token>,
        double_sided: bool,
    ) -> ContainerHandle {
        let mut entries = vec![
            (TOPOLOGY, DataSource::Container(topology)),
            (DOUBLE_SIDED, retained_bool(double_sided)),
        ];
        if let Some(scheme) = subdivision_scheme {
            entries.push((SUBDIVISION_SCHEME, retained_value(scheme)));
        }
        RetainedContainerDataSource::new(entries)
    }
}

impl Schema for MeshSchema {
    const SCHEMA_TOKEN: &'static str = MESH;

    fn from_container(container: ContainerHandle) -> Self {
        Self { container }
    }

    fn container(&self) -> &ContainerHandle {
        &self.container
    }
}

/// View over `mesh.topology`.
#[derive(Clone)]
pub struct MeshTopologySchema {
    container: ContainerHandle,
}

impl MeshTopologySchema {
    pub fn face_vertex_counts(&self) -> Option<Vec<i32>> {
        typed_child(&self.container, FACE_VERTEX_COUNTS)
    }

    pub fn face_vertex_indices(&self) -> Option<Vec<i32>> {
        typed_child(&self.container, FACE_VERTEX_INDICES)
    }

    pub fn orientation(&self) -> Option<Token> {
        typed_child(&self.container, ORIENTATION)
    }

    pub fn build_retained(counts: Vec<i32>, indices: Vec<i32>, orientation: Option<Token>) -> ContainerHandle {
        let mut entries = vec![
            (FACE_VERTEX_COUNTS, retained_value(counts)),
            (FACE_VERTEX_INDICES, retained_value(indices)),
        ];
        if let Some(orientation) = orientation {
            entries.push((ORIENTATION, retained_value(orientation)));
        }
        RetainedContainerDataSource::new(entries)
    }
}

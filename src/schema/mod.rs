//! Typed views over prim containers.
//!
//! A schema wraps a container and reads fixed keys from it. Schemas never
//! own data; builders produce retained containers in the matching layout.
//!
//! - [`VisibilitySchema`], [`PurposeSchema`] - Simple per-prim flags
//! - [`PrimvarsSchema`] / [`PrimvarSchema`] - Primitive variables
//! - [`MaterialBindingsSchema`] - Material bindings per purpose
//! - [`MaterialSchema`] - Material networks, plus flat network conversion
//! - [`XformSchema`] - Local transform
//! - [`MeshSchema`], [`BasisCurvesSchema`], [`CameraSchema`] - Prim types

mod visibility;
mod purpose;
mod primvars;
mod material_bindings;
mod material;
mod xform;
mod mesh;
mod basis_curves;
mod camera;

pub use visibility::*;
pub use purpose::*;
pub use primvars::*;
pub use material_bindings::*;
pub use material::*;
pub use xform::*;
pub use mesh::*;
pub use basis_curves::*;
pub use camera::*;

use crate::core::{ContainerHandle, DataSource, DataSourceLocator, SampledHandle};
use crate::util::{Token, ValueType};

/// Prim type tokens.
pub mod prim_types {
    pub const MESH: &str = "mesh";
    pub const BASIS_CURVES: &str = "basisCurves";
    pub const POINTS: &str = "points";
    pub const CAMERA: &str = "camera";
    pub const MATERIAL: &str = "material";
    pub const SCOPE: &str = "scope";
}

/// A typed view over one named container of a prim.
pub trait Schema: Sized {
    /// Key of the schema container inside the prim container.
    const SCHEMA_TOKEN: &'static str;

    fn from_container(container: ContainerHandle) -> Self;

    fn container(&self) -> &ContainerHandle;

    /// Find this schema's container inside a prim container.
    fn from_parent(prim: &ContainerHandle) -> Option<Self> {
        prim.get(&Token::new(Self::SCHEMA_TOKEN))
            .and_then(DataSource::into_container)
            .map(Self::from_container)
    }

    /// Locator of this schema inside the prim container.
    fn default_locator() -> DataSourceLocator {
        DataSourceLocator::new([Self::SCHEMA_TOKEN])
    }
}

/// Sampled child `name` of `container`.
pub(crate) fn sampled_child(container: &ContainerHandle, name: &str) -> Option<SampledHandle> {
    container.get(&Token::new(name)).and_then(|ds| match ds {
        DataSource::Sampled(s) => Some(s),
        _ => None,
    })
}

/// Typed value of child `name` at time zero.
pub(crate) fn typed_child<T: ValueType>(container: &ContainerHandle, name: &str) -> Option<T> {
    sampled_child(container, name).and_then(|s| T::from_value(&s.value(0.0)))
}

/// Container child `name`.
pub(crate) fn container_child(container: &ContainerHandle, name: &str) -> Option<ContainerHandle> {
    container.get(&Token::new(name)).and_then(DataSource::into_container)
}

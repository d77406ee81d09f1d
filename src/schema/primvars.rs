//! Primvar schemas.
//!
//! `primvars` maps primvar names to containers holding either a flat
//! `primvarValue` or an `indexedPrimvarValue` plus `indices`, along with
//! the `interpolation` and `role` tokens.

use super::{container_child, sampled_child, typed_child, Schema};
use crate::core::{
    retained_value, ContainerHandle, DataSource, DataSourceLocator, RetainedContainerDataSource,
    SampledHandle,
};
use crate::util::Token;

pub const PRIMVARS: &str = "primvars";
pub const PRIMVAR_VALUE: &str = "primvarValue";
pub const INDEXED_PRIMVAR_VALUE: &str = "indexedPrimvarValue";
pub const INDICES: &str = "indices";
pub const INTERPOLATION: &str = "interpolation";
pub const ROLE: &str = "role";

/// Well-known primvar names.
pub const POINTS_PRIMVAR: &str = "points";
pub const WIDTHS_PRIMVAR: &str = "widths";
pub const NORMALS_PRIMVAR: &str = "normals";

/// Primvar interpolation tokens.
pub mod interpolation {
    pub const CONSTANT: &str = "constant";
    pub const UNIFORM: &str = "uniform";
    pub const VARYING: &str = "varying";
    pub const VERTEX: &str = "vertex";
    pub const FACE_VARYING: &str = "faceVarying";
    pub const INSTANCE: &str = "instance";
}

/// View over a prim's `primvars` container.
#[derive(Clone)]
pub struct PrimvarsSchema {
    container: ContainerHandle,
}

impl PrimvarsSchema {
    pub fn primvar_names(&self) -> Vec<Token> {
        self.container.names()
    }

    pub fn primvar(&self, name: &str) -> Option<PrimvarSchema> {
        container_child(&self.container, name).map(|container| PrimvarSchema { container })
    }

    /// Locator of one primvar inside the prim container.
    pub fn primvar_locator(name: &str) -> DataSourceLocator {
        DataSourceLocator::new([PRIMVARS, name])
    }

    pub fn build_retained<I, N>(primvars: I) -> ContainerHandle
    where
        I: IntoIterator<Item = (N, ContainerHandle)>,
        N: Into<Token>,
    {
        RetainedContainerDataSource::new(
            primvars
                .into_iter()
                .map(|(name, c)| (name.into(), DataSource::Container(c))),
        )
    }
}

impl Schema for PrimvarsSchema {
    const SCHEMA_TOKEN: &'static str = PRIMVARS;

    fn from_container(container: ContainerHandle) -> Self {
        Self { container }
    }

    fn container(&self) -> &ContainerHandle {
        &self.container
    }
}

/// View over one primvar container.
#[derive(Clone)]
pub struct PrimvarSchema {
    container: ContainerHandle,
}

impl PrimvarSchema {
    pub fn from_container(container: ContainerHandle) -> Self {
        Self { container }
    }

    pub fn container(&self) -> &ContainerHandle {
        &self.container
    }

    pub fn primvar_value(&self) -> Option<SampledHandle> {
        sampled_child(&self.container, PRIMVAR_VALUE)
    }

    pub fn indexed_primvar_value(&self) -> Option<SampledHandle> {
        sampled_child(&self.container, INDEXED_PRIMVAR_VALUE)
    }

    pub fn indices(&self) -> Option<SampledHandle> {
        sampled_child(&self.container, INDICES)
    }

    pub fn interpolation(&self) -> Option<Token> {
        typed_child(&self.container, INTERPOLATION)
    }

    pub fn role(&self) -> Option<Token> {
        typed_child(&self.container, ROLE)
    }

    /// True when the primvar stores indexed values.
    pub fn is_indexed(&self) -> bool {
        self.container.get(&Token::new(INDEXED_PRIMVAR_VALUE)).is_some()
    }
}

/// Builds a primvar container.
#[derive(Default)]
pub struct PrimvarSchemaBuilder {
    primvar_value: Option<SampledHandle>,
    indexed_primvar_value: Option<SampledHandle>,
    indices: Option<SampledHandle>,
    interpolation: Option<Token>,
    role: Option<Token>,
}

impl PrimvarSchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primvar_value(mut self, value: SampledHandle) -> Self {
        self.primvar_value = Some(value);
        self
    }

    pub fn indexed_primvar_value(mut self, value: SampledHandle) -> Self {
        self.indexed_primvar_value = Some(value);
        self
    }

    pub fn indices(mut self, indices: SampledHandle) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn interpolation(mut self, interpolation: impl Into<Token>) -> Self {
        self.interpolation = Some(interpolation.into());
        self
    }

    pub fn role(mut self, role: impl Into<Token>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn build(self) -> ContainerHandle {
        let mut entries: Vec<(&str, DataSource)> = Vec::new();
        if let Some(v) = self.primvar_value {
            entries.push((PRIMVAR_VALUE, DataSource::Sampled(v)));
        }
        if let Some(v) = self.indexed_primvar_value {
            entries.push((INDEXED_PRIMVAR_VALUE, DataSource::Sampled(v)));
        }
        if let Some(v) = self.indices {
            entries.push((INDICES, DataSource::Sampled(v)));
        }
        if let Some(v) = self.interpolation {
            entries.push((INTERPOLATION, retained_value(v)));
        }
        if let Some(v) = self.role {
            entries.push((ROLE, retained_value(v)));
        }
        RetainedContainerDataSource::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RetainedSampledDataSource;

    #[test]
    fn test_primvar_roundtrip() {
        let fresh = PrimvarSchemaBuilder::new()
            .primvar_value(RetainedSampledDataSource::new(true))
            .interpolation(interpolation::CONSTANT)
            .build();
        let glossy = PrimvarSchemaBuilder::new()
            .indexed_primvar_value(RetainedSampledDataSource::new(vec![0.5f32]))
            .indices(RetainedSampledDataSource::new(vec![0, 0]))
            .interpolation(interpolation::VERTEX)
            .build();
        let prim = RetainedContainerDataSource::new([(
            PRIMVARS,
            DataSource::Container(PrimvarsSchema::build_retained([("fresh", fresh), ("foo:glossy", glossy)])),
        )]);

        let primvars = PrimvarsSchema::from_parent(&prim).unwrap();
        assert_eq!(primvars.primvar_names().len(), 2);

        let fresh = primvars.primvar("fresh").unwrap();
        assert!(!fresh.is_indexed());
        assert_eq!(fresh.interpolation().unwrap(), "constant");

        let glossy = primvars.primvar("foo:glossy").unwrap();
        assert!(glossy.is_indexed());
        assert_eq!(glossy.indices().unwrap().value(0.0).array_len(), Some(2));
        assert!(primvars.primvar("missing").is_none());
        assert_eq!(PrimvarsSchema::primvar_locator("points").to_string(), "primvars.points");
    }
}

//! Material binding schemas.
//!
//! `materialBindings` maps a purpose token to a binding container whose
//! `path` names the bound material. The empty token is the all-purpose
//! binding.

use super::{container_child, typed_child, Schema};
use crate::core::{retained_value, ContainerHandle, DataSource, RetainedContainerDataSource};
use crate::util::{ScenePath, Token};

pub const MATERIAL_BINDINGS: &str = "materialBindings";
pub const MATERIAL_BINDING_PATH: &str = "path";

/// Binding purpose tokens.
pub mod binding_purpose {
    /// The all-purpose binding key.
    pub const ALL_PURPOSE: &str = "";
    pub const PREVIEW: &str = "preview";
    pub const FULL: &str = "full";
}

/// View over a prim's `materialBindings` container.
#[derive(Clone)]
pub struct MaterialBindingsSchema {
    container: ContainerHandle,
}

impl MaterialBindingsSchema {
    pub fn purposes(&self) -> Vec<Token> {
        self.container.names()
    }

    pub fn binding(&self, purpose: &str) -> Option<MaterialBindingSchema> {
        container_child(&self.container, purpose).map(|container| MaterialBindingSchema { container })
    }

    /// The all-purpose binding.
    pub fn all_purpose_binding(&self) -> Option<MaterialBindingSchema> {
        self.binding(binding_purpose::ALL_PURPOSE)
    }

    /// Build from `(purpose, material path)` pairs.
    pub fn build_retained<I, N>(bindings: I) -> ContainerHandle
    where
        I: IntoIterator<Item = (N, ScenePath)>,
        N: Into<Token>,
    {
        RetainedContainerDataSource::new(bindings.into_iter().map(|(purpose, path)| {
            (
                purpose.into(),
                DataSource::Container(MaterialBindingSchema::build_retained(path)),
            )
        }))
    }
}

impl Schema for MaterialBindingsSchema {
    const SCHEMA_TOKEN: &'static str = MATERIAL_BINDINGS;

    fn from_container(container: ContainerHandle) -> Self {
        Self { container }
    }

    fn container(&self) -> &ContainerHandle {
        &self.container
    }
}

/// View over one binding container.
#[derive(Clone)]
pub struct MaterialBindingSchema {
    container: ContainerHandle,
}

impl MaterialBindingSchema {
    pub fn path(&self) -> Option<ScenePath> {
        typed_child(&self.container, MATERIAL_BINDING_PATH)
    }

    pub fn build_retained(path: ScenePath) -> ContainerHandle {
        RetainedContainerDataSource::new([(MATERIAL_BINDING_PATH, retained_value(path))])
    }
}

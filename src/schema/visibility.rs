//! Visibility schema.
//!
//! A prim is visible unless its `visibility.visibility` flag is authored
//! false. Collection predicates distinguish authored from unauthored.

use super::{typed_child, Schema};
use crate::core::{retained_bool, ContainerHandle, DataSourceLocator, RetainedContainerDataSource};

/// Name of the visibility container and its flag.
pub const VISIBILITY: &str = "visibility";

/// View over a prim's `visibility` container.
#[derive(Clone)]
pub struct VisibilitySchema {
    container: ContainerHandle,
}

impl VisibilitySchema {
    /// The authored visibility flag.
    pub fn visibility(&self) -> Option<bool> {
        typed_child(&self.container, VISIBILITY)
    }

    /// Locator of the flag inside the prim container.
    pub fn visibility_locator() -> DataSourceLocator {
        DataSourceLocator::new([VISIBILITY, VISIBILITY])
    }

    /// Build a visibility container.
    pub fn build_retained(visibility: Option<bool>) -> ContainerHandle {
        RetainedContainerDataSource::new(visibility.map(|v| (VISIBILITY, retained_bool(v))))
    }
}

impl Schema for VisibilitySchema {
    const SCHEMA_TOKEN: &'static str = VISIBILITY;

    fn from_container(container: ContainerHandle) -> Self {
        Self { container }
    }

    fn container(&self) -> &ContainerHandle {
        &self.container
    }
}

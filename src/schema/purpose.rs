//! Purpose schema.

use super::{typed_child, Schema};
use crate::core::{retained_value, ContainerHandle, RetainedContainerDataSource};
use crate::util::Token;

/// Name of the purpose container and its token.
pub const PURPOSE: &str = "purpose";

/// View over a prim's `purpose` container.
#[derive(Clone)]
pub struct PurposeSchema {
    container: ContainerHandle,
}

impl PurposeSchema {
    pub fn purpose(&self) -> Option<Token> {
        typed_child(&self.container, PURPOSE)
    }

    pub fn build_retained(purpose: impl Into<Token>) -> ContainerHandle {
        RetainedContainerDataSource::new([(PURPOSE, retained_value(purpose.into()))])
    }
}

impl Schema for PurposeSchema {
    const SCHEMA_TOKEN: &'static str = PURPOSE;

    fn from_container(container: ContainerHandle) -> Self {
        Self { container }
    }

    fn container(&self) -> &ContainerHandle {
        &self.container
    }
}

//! Transform schema.

use super::{typed_child, Schema};
use crate::core::{retained_bool, retained_value, ContainerHandle, RetainedContainerDataSource};
use crate::util::DMat4;

pub const XFORM: &str = "xform";
pub const XFORM_MATRIX: &str = "matrix";
pub const RESET_XFORM_STACK: &str = "resetXformStack";

/// View over a prim's `xform` container.
#[derive(Clone)]
pub struct XformSchema {
    container: ContainerHandle,
}

impl XformSchema {
    pub fn matrix(&self) -> Option<DMat4> {
        typed_child(&self.container, XFORM_MATRIX)
    }

    /// True when the transform ignores the parent transform.
    pub fn reset_xform_stack(&self) -> bool {
        typed_child(&self.container, RESET_XFORM_STACK).unwrap_or(false)
    }

    pub fn build_retained(matrix: DMat4, reset_xform_stack: bool) -> ContainerHandle {
        RetainedContainerDataSource::new([
            (XFORM_MATRIX, retained_value(matrix)),
            (RESET_XFORM_STACK, retained_bool(reset_xform_stack)),
        ])
    }
}

impl Schema for XformSchema {
    const SCHEMA_TOKEN: &'static str = XFORM;

    fn from_container(container: ContainerHandle) -> Self {
        Self { container }
    }

    fn container(&self) -> &ContainerHandle {
        &self.container
    }
}

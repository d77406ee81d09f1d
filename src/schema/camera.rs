//! Camera schema.

use super::{typed_child, Schema};
use crate::core::{retained_value, ContainerHandle, RetainedContainerDataSource};
use crate::util::Token;

pub const CAMERA: &str = "camera";
pub const PROJECTION: &str = "projection";
pub const FOCAL_LENGTH: &str = "focalLength";
pub const HORIZONTAL_APERTURE: &str = "horizontalAperture";
pub const VERTICAL_APERTURE: &str = "verticalAperture";
pub const CLIPPING_RANGE: &str = "clippingRange";

/// View over a prim's `camera` container.
#[derive(Clone)]
pub struct CameraSchema {
    container: ContainerHandle,
}

impl CameraSchema {
    pub fn projection(&self) -> Option<Token> {
        typed_child(&self.container, PROJECTION)
    }

    pub fn focal_length(&self) -> Option<f32> {
        typed_child(&self.container, FOCAL_LENGTH)
    }

    pub fn build_retained(projection: impl Into<Token>, focal_length: f32) -> ContainerHandle {
        RetainedContainerDataSource::new([
            (PROJECTION, retained_value(projection.into())),
            (FOCAL_LENGTH, retained_value(focal_length)),
        ])
    }
}

impl Schema for CameraSchema {
    const SCHEMA_TOKEN: &'static str = CAMERA;

    fn from_container(container: ContainerHandle) -> Self {
        Self { container }
    }

    fn container(&self) -> &ContainerHandle {
        &self.container
    }
}

//! Core layer - the data source model.
//!
//! This module provides:
//! - [`ContainerDataSource`] / [`SampledDataSource`] / [`VectorDataSource`] - Node traits
//! - [`DataSource`] - Shared handle over any node kind
//! - Retained (eager) node implementations
//! - [`OverlayContainerDataSource`] - Strongest-first layering
//! - [`ContainerDataSourceEditor`] - Patched containers from set/overlay edits
//! - [`DataSourceLocator`] / [`DataSourceLocatorSet`] - Addressing nested data
//! - Time-sample resampling and [`debug_print`]

mod data_source;
mod locator;
mod retained;
mod overlay;
mod editor;
mod debug;
mod time_sample;

pub use data_source::{
    container_ptr_eq, resolve, resolve_container, ContainerDataSource, ContainerHandle,
    DataSource, SampledDataSource, SampledHandle, VectorDataSource, VectorHandle,
};
pub use locator::{DataSourceLocator, DataSourceLocatorSet};
pub use retained::{
    retained_bool, retained_container, retained_value, RetainedContainerDataSource,
    RetainedSampledDataSource, RetainedSmallVectorDataSource, RetainedTimeSampledDataSource,
};
pub use overlay::OverlayContainerDataSource;
pub use editor::ContainerDataSourceEditor;
pub use debug::debug_print;
pub use time_sample::{resample_neighbors, resample_raw_time_samples, TimeSampleArray};

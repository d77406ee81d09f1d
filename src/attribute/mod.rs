//! Attributes: authored values over time with value blocking.
//!
//! - [`Attribute`] - In-memory default value plus time samples
//! - [`AttributeQuery`] - The read interface consumers depend on
//! - [`AttributeDataSource`] - An attribute surfaced as a sampled data source
//!
//! A *block* is an authored opinion meaning "no value". Every read path
//! reports a blocked attribute as absent, while time-sample queries still
//! see the blocked sample's time.

mod store;
mod data_source;

pub use store::{Attribute, AttributeQuery, AttributeValue};
pub use data_source::AttributeDataSource;

//! Basic vocabulary shared by every layer.
//!
//! - [`Token`] - Shared immutable names
//! - [`ScenePath`] - Hierarchical prim paths
//! - [`Value`] / [`ValueType`] - Typed leaf values
//! - [`Error`] / [`Result`] - Error handling
//! - [`diagnostic`] - Recoverable coding-error channel
//! - Math type re-exports from glam

mod token;
mod path;
mod value;
mod error;
mod math;
pub mod diagnostic;

pub use token::*;
pub use path::*;
pub use value::*;
pub use error::*;
pub use math::*;
pub use diagnostic::{CodingError, ErrorMark};

/// Shutter-relative sample time.
pub type Time = f64;

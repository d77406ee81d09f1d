//! Error types for the scene-index library.
//!
//! Only genuine failures are errors. Structural absence (a missing prim,
//! an unresolved locator) is reported as `None` or an empty result, and
//! programmer misuse that has a safe fallback goes through
//! [`crate::util::diagnostic`] instead.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scene-index operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The dependency graph handed to the sorter contains a cycle.
    #[error("Dependency cycle detected at node {0}")]
    DependencyCycle(String),

    /// A path string could not be parsed.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A path or predicate expression could not be parsed.
    #[error("Expression parse error at offset {offset}: {message}")]
    ExpressionParse { offset: usize, message: String },

    /// Input scene index position out of bounds
    #[error("Input index {index} out of bounds (count: {count})")]
    InputOutOfBounds { index: usize, count: usize },

    /// Type mismatch when reading a value
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Scene description (JSON) is malformed
    #[error("Invalid scene description: {0}")]
    InvalidScene(String),

    /// Settings file not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an expression parse error.
    pub fn parse(offset: usize, message: impl Into<String>) -> Self {
        Self::ExpressionParse {
            offset,
            message: message.into(),
        }
    }
}

/// Result type alias for scene-index operations.
pub type Result<T> = std::result::Result<T, Error>;

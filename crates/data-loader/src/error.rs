//! Error types for the data-loader crate.
//!
//! Two kinds of failure come out of this crate:
//! - `DataLoadError` is fatal and only happens while building a `DatasetStore`
//! - `NotFoundError` is recoverable and happens when a lookup key is absent

use crate::types::MovieId;
use thiserror::Error;

/// Errors that can occur while loading and validating the dataset
///
/// Every variant is raised at load time. A store that was built successfully
/// never produces one of these afterwards.
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in the catalog file couldn't be parsed
    ///
    /// This variant stores context about where the error occurred
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// The similarity file header or payload is malformed
    #[error("Malformed similarity matrix: {0}")]
    MalformedMatrix(String),

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Catalog length and matrix dimensions disagree
    #[error(
        "Dimension mismatch: catalog has {catalog} movies but similarity matrix is {rows}x{cols}"
    )]
    DimensionMismatch {
        catalog: usize,
        rows: usize,
        cols: usize,
    },

    /// Two catalog records share the same movie id
    #[error("Duplicate movie id {id} at catalog index {index}")]
    DuplicateId { id: MovieId, index: usize },

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// A lookup key that is not present in the catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotFoundError {
    #[error("No such title: {0}")]
    Title(String),

    #[error("No such movie id: {0}")]
    MovieId(MovieId),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;

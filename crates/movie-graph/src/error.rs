//! Error types for the movie-graph crate.
//!
//! Everything that can go wrong while reading a graph snapshot from disk
//! ends up in [`GraphError`]. Queries against an already-built index never
//! fail; missing entities are reported as `None` or empty slices instead.

use thiserror::Error;

/// Errors that can occur while loading or validating a graph snapshot
#[derive(Error, Debug)]
pub enum GraphError {
    /// Snapshot file could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading a file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a snapshot file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Expected number of fields in a line doesn't match actual
    #[error("Expected {expected} fields but found {found} in line {line} of {file}")]
    FieldCountMismatch {
        file: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    /// An edge points at an entity that doesn't exist
    /// (e.g. a rating for a movie that isn't in movies.dat)
    #[error("Missing reference: {entity} with id {id}")]
    MissingReference { entity: String, id: String },

    /// Snapshot validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, GraphError>;

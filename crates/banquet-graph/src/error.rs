//! Error types for graph and memory-file persistence.

use thiserror::Error;

/// Result type for graph-store operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Failures reading or writing a persisted graph or memory file.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The path being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file's contents did not parse as the expected shape.
    #[error("malformed contents in {path}: {source}")]
    Malformed {
        /// The path being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// A record passed to `insert` was missing a required field.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

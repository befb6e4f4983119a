//! Error types for the retrieval layer.

use thiserror::Error;

/// Result type for retrieval-layer operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors raised while loading or persisting a retrieval pattern file.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// The pattern file could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The path involved.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The pattern file's contents did not parse as JSON.
    #[error("malformed pattern file {path}: {source}")]
    Malformed {
        /// The path involved.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

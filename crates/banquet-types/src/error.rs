//! Error types shared by the type layer.

use thiserror::Error;

/// Result type for type-layer operations.
pub type Result<T> = std::result::Result<T, TypesError>;

/// Errors raised while constructing or validating shared types.
#[derive(Error, Debug)]
pub enum TypesError {
    /// Criteria failed structural validation (negative budget, unknown category, ...).
    #[error("invalid criteria: {0}")]
    InvalidCriteria(String),

    /// A session id did not parse as a UUID or was otherwise malformed.
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    /// Serialization/deserialization of a belief value failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

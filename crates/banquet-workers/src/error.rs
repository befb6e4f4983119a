//! Error type for the category workers.

use thiserror::Error;

/// Result type for worker operations.
pub type Result<T> = std::result::Result<T, WorkerError>;

/// Errors raised while a category worker runs a search.
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Reading or writing a category's graph failed.
    #[error("graph error: {0}")]
    Graph(#[from] banquet_graph::GraphError),
}

//! Error types for the budget distributor.

use thiserror::Error;

/// Result type for budget-layer operations.
pub type Result<T> = std::result::Result<T, BudgetError>;

/// Errors raised while distributing a budget.
#[derive(Error, Debug)]
pub enum BudgetError {
    /// Persisting or loading a user's weight history failed.
    #[error("user preference store error: {0}")]
    Prefs(#[from] banquet_graph::GraphError),
}

//! Per-category budget distribution: weight inference and history,
//! constraint scanning, and a simulated-annealing optimizer that splits a
//! total budget across venue, catering, and decor.

#![warn(missing_docs)]

mod constraints;
mod distributor;
mod error;
mod optimizer;
mod weights;

pub use constraints::ServiceConstraints;
pub use distributor::BudgetDistributor;
pub use error::{BudgetError, Result};
pub use weights::{consistency, default_weights, merge, normalize_weights, NullWeightInferenceClient, WeightInferenceClient};

//! Small in-process knowledge stores consulted by the Planner and the
//! category workers: style-conditioned recommendation tables, a seed
//! budget split by style, and the error-to-correction-strategy catalogue.
//!
//! Every layer exposes the same two operations the core relies on —
//! `recommend(context)` and `update(pattern, success)` — backed by a
//! JSON pattern file persisted the same way the knowledge graph persists
//! its own files.

#![warn(missing_docs)]

mod error;
mod persist;
mod success_log;

pub mod catering;
pub mod decor;
pub mod planner;
pub mod venue;

pub use error::{Result, RetrievalError};
pub use success_log::{SuccessEntry, SuccessLog};

pub use catering::{CateringRecommendation, CateringRetrieval};
pub use decor::{DecorRecommendation, DecorRetrieval};
pub use planner::PlannerRetrieval;
pub use venue::{VenueRecommendation, VenueRetrieval};

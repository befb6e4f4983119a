//! The BDI planner core.
//!
//! Owns a session's lifecycle from `user_request` to `final_response`: the
//! [`Planner`] registers a single bus endpoint and, for every accepted
//! request, spawns a [`cycle::SessionCycle`] that runs the
//! sense-deliberate-plan-act-reconsider loop against that session's own
//! belief state, desires, intentions and task queue.

#![warn(missing_docs)]

mod cycle;
pub mod endpoints;
mod error;
mod planner;
mod wire;

pub use error::{PlannerError, Result};
pub use planner::Planner;
pub use endpoints::WorkerEndpoints;

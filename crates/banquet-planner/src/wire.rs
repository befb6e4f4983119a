//! Internal task-parameter shapes.
//!
//! The External Interfaces section of the wire contract only pins down the
//! `user_request` and `final_response` shapes exchanged with the outside
//! world; everything a `task` message carries internally between the
//! Planner and a worker endpoint is this crate's own business, so it gets a
//! concrete struct rather than a duck-typed `Value`.

use banquet_types::Criteria;
use serde::{Deserialize, Serialize};

/// Parameters for a `venue_search` / `catering_search` / `decor_search` task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SearchTaskParams {
    pub criteria: Criteria,
    #[serde(default)]
    pub seed_urls: Vec<String>,
}

/// Parameters for a `budget_distribution` task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct BudgetTaskParams {
    pub user_id: String,
    pub total_budget: u64,
    pub criteria: Criteria,
}

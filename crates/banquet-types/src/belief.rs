//! Per-session belief state: the Planner's working memory of facts.

use crate::criteria::{Category, Criteria};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Lifecycle state of a planning session.
///
/// `state = Completed` only once every category belief is set; an error
/// pushes the session into `ErrorRecovery`, from which the next successful
/// response returns it to `InProgress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No task has been dispatched yet.
    Initial,
    /// At least one task is in flight or has completed.
    InProgress,
    /// The last task failed and intention reconsideration is underway.
    ErrorRecovery,
    /// Every category belief is set; a final response has been emitted.
    Completed,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState::Initial
    }
}

/// Counters for the session's task queue.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TaskProgress {
    /// Tasks queued but not yet dispatched.
    pub pending: u32,
    /// Tasks that completed successfully.
    pub completed: u32,
    /// Tasks that failed permanently.
    pub failed: u32,
    /// Total tasks ever created for this session.
    pub total: u32,
}

/// One entry in a session's error history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// The task type that failed (e.g. `venue_search`).
    pub task_type: String,
    /// Human-readable error message.
    pub error: String,
    /// When the error was recorded.
    pub timestamp: DateTime<Utc>,
    /// How many times this task type has been retried so far.
    pub retry_count: u32,
}

/// A correction strategy synthesized in response to a recorded error:
/// pairs an error condition with the parameters used to build a
/// replacement task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionStrategy {
    /// Strategy kind, e.g. `venue_relax_constraints`, `budget_adjustment`.
    pub strategy_type: String,
    /// Short human description.
    pub description: String,
    /// Parameters merged into the replacement task (e.g. `relax_factor`).
    pub parameters: BTreeMap<String, Value>,
}

/// Per-session belief state: the mapping from well-known keys to opaque
/// values, plus the derived fields the Planner's state machine depends on.
///
/// Invariant: `completed[c] ⇔ beliefs[c] != null` for every category `c`,
/// and `state == Completed` implies every `completed[c]` is true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeliefState {
    /// The normalized criteria this session is planning against.
    pub criteria: Option<Criteria>,
    /// Per-category budget allocation, once the Budget Distributor has run.
    pub assigned_budget: BTreeMap<Category, u64>,
    /// Sum of the prices of the selected candidates, once known.
    pub used_budget: f64,
    /// Candidate list (while searching) or the selected top candidate
    /// (once the category is complete), per category.
    pub results: BTreeMap<Category, Value>,
    /// Whether each category has a settled belief.
    pub completed: BTreeMap<Category, bool>,
    /// Running count of detected conflicts (counter only; see DESIGN.md).
    pub conflicts: u32,
    /// Session lifecycle state.
    pub state: SessionState,
    /// Task queue counters.
    pub task_progress: TaskProgress,
    /// Ordered history of every error recorded for this session.
    pub error_history: Vec<ErrorRecord>,
    /// The most recent error, if any.
    pub last_error: Option<ErrorRecord>,
    /// Correction strategies generated for the most recent error.
    pub correction_strategies: Vec<CorrectionStrategy>,
    /// When any field in this struct was last updated.
    pub last_updated: DateTime<Utc>,
}

impl BeliefState {
    /// A fresh belief state for a newly created session.
    pub fn new() -> Self {
        let mut completed = BTreeMap::new();
        for c in Category::ALL {
            completed.insert(c, false);
        }
        Self {
            criteria: None,
            assigned_budget: BTreeMap::new(),
            used_budget: 0.0,
            results: BTreeMap::new(),
            completed,
            conflicts: 0,
            state: SessionState::Initial,
            task_progress: TaskProgress::default(),
            error_history: Vec::new(),
            last_error: None,
            correction_strategies: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Set the result belief for `category`, marking it complete, and
    /// refresh `last_updated`.
    pub fn set_result(&mut self, category: Category, value: Value) {
        self.results.insert(category, value);
        self.completed.insert(category, true);
        self.last_updated = Utc::now();
    }

    /// True once every requested category has a settled belief.
    pub fn all_categories_complete(&self, requested: &[Category]) -> bool {
        requested.iter().all(|c| *self.completed.get(c).unwrap_or(&false))
    }

    /// Record an error, appending to history and updating `last_error`.
    pub fn record_error(&mut self, record: ErrorRecord) {
        self.last_error = Some(record.clone());
        self.error_history.push(record);
        self.last_updated = Utc::now();
    }
}

impl Default for BeliefState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_has_no_completed_categories() {
        let beliefs = BeliefState::new();
        assert!(!beliefs.all_categories_complete(&Category::ALL));
        assert_eq!(beliefs.state, SessionState::Initial);
    }

    #[test]
    fn setting_all_results_completes_requested_categories() {
        let mut beliefs = BeliefState::new();
        for c in Category::ALL {
            beliefs.set_result(c, Value::Null);
        }
        assert!(beliefs.all_categories_complete(&Category::ALL));
    }
}

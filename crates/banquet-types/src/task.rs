//! Tasks: the unit of work the Planner dispatches over the Message Bus.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// What kind of work a task performs.
///
/// Correction tasks reuse the same type as the work they retry (a relaxed
/// `venue_search` is still a `venue_search`); `Correction` is the fallback
/// for a strategy with no known task-type mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum TaskType {
    /// Compute the per-category budget allocation.
    BudgetDistribution,
    /// Search for a venue candidate.
    VenueSearch,
    /// Search for a catering candidate.
    CateringSearch,
    /// Search for a decor candidate.
    DecorSearch,
    /// A correction task whose strategy had no direct task-type mapping.
    Correction(String),
}

impl TaskType {
    /// The category this task type searches for, if any.
    pub fn category(&self) -> Option<crate::criteria::Category> {
        match self {
            TaskType::VenueSearch => Some(crate::criteria::Category::Venue),
            TaskType::CateringSearch => Some(crate::criteria::Category::Catering),
            TaskType::DecorSearch => Some(crate::criteria::Category::Decor),
            _ => None,
        }
    }

    /// Stable string name, used as the Bus endpoint / message `task_type`.
    pub fn as_str(&self) -> &str {
        match self {
            TaskType::BudgetDistribution => "budget_distribution",
            TaskType::VenueSearch => "venue_search",
            TaskType::CateringSearch => "catering_search",
            TaskType::DecorSearch => "decor_search",
            TaskType::Correction(s) => s.as_str(),
        }
    }
}

/// Status of a task as it moves through the Planner's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Queued, not yet sent to a worker.
    Pending,
    /// Dispatched; awaiting a response.
    InFlight,
    /// A response was received and accepted.
    Completed,
    /// Exhausted all correction strategies; permanently failed.
    Error,
    /// Failed once but a correction task has been enqueued in its place.
    RetryPending,
}

/// A unit of work owned by exactly one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Globally unique task id.
    pub id: Uuid,
    /// The session this task belongs to.
    pub session_id: Uuid,
    /// What kind of work this task performs.
    pub task_type: TaskType,
    /// Parameters, typically a subset of the session's criteria merged
    /// with correction-strategy overrides.
    pub parameters: Value,
    /// Current status.
    pub status: TaskStatus,
    /// The worker's reply, once completed.
    pub result: Option<Value>,
    /// The error message, if the task failed.
    pub error: Option<String>,
    /// Number of times this task type has been retried for this session.
    pub retry_count: u32,
}

impl Task {
    /// Create a new, pending task.
    pub fn new(session_id: Uuid, task_type: TaskType, parameters: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            task_type,
            parameters,
            status: TaskStatus::Pending,
            result: None,
            error: None,
            retry_count: 0,
        }
    }
}

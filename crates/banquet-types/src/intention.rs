//! Intentions: committed task plans backing an active desire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an intention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentionStatus {
    /// Currently contributing tasks to the session's queue.
    Active,
    /// Suspended during reconsideration; its pending tasks were dequeued.
    Suspended,
    /// All tasks completed or permanently failed.
    Done,
}

/// An ordered plan of tasks committed in service of a single desire.
///
/// Exactly one desire maps to one intention at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intention {
    /// Unique id.
    pub id: Uuid,
    /// The desire this intention commits to.
    pub desire_id: Uuid,
    /// Ordered task ids belonging to this intention.
    pub tasks: Vec<Uuid>,
    /// Lifecycle status.
    pub status: IntentionStatus,
}

impl Intention {
    /// Construct a new, active intention with no tasks yet.
    pub fn new(desire_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            desire_id,
            tasks: Vec::new(),
            status: IntentionStatus::Active,
        }
    }

    /// Suspend this intention, dropping every task id that has not yet
    /// been recorded as dispatched by the caller (the Planner is
    /// responsible for removing the same ids from its pending queue).
    pub fn suspend(&mut self) {
        self.status = IntentionStatus::Suspended;
    }
}

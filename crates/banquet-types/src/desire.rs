//! Desires: goals the Planner wants to see satisfied for a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Lifecycle of a desire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesireStatus {
    /// Currently driving an intention.
    Active,
    /// Superseded or paused during intention reconsideration.
    Suspended,
    /// Fully satisfied.
    Done,
}

/// A goal, with a priority used to order which intention forms first.
///
/// Priorities: 1.0 `complete_event_planning`; 0.9 `find_venue`; 0.8
/// `find_catering`; 0.7 `find_decor`; corrections 0.9-0.95.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Desire {
    /// Unique id.
    pub id: Uuid,
    /// Desire type, e.g. `complete_event_planning`, `find_venue`,
    /// `fix_venue`.
    pub desire_type: String,
    /// Priority in `[0, 1]`; higher forms its intention first.
    pub priority: f64,
    /// Parameters carried into the intention's tasks.
    pub parameters: Value,
    /// Lifecycle status.
    pub status: DesireStatus,
    /// When this desire was generated.
    pub created_at: DateTime<Utc>,
}

impl Desire {
    /// Priority assigned to the top-level planning desire.
    pub const PRIORITY_COMPLETE_EVENT_PLANNING: f64 = 1.0;
    /// Priority assigned to `find_venue`.
    pub const PRIORITY_FIND_VENUE: f64 = 0.9;
    /// Priority assigned to `find_catering`.
    pub const PRIORITY_FIND_CATERING: f64 = 0.8;
    /// Priority assigned to `find_decor`.
    pub const PRIORITY_FIND_DECOR: f64 = 0.7;

    /// Construct a new, active desire.
    pub fn new(desire_type: impl Into<String>, priority: f64, parameters: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            desire_type: desire_type.into(),
            priority,
            parameters,
            status: DesireStatus::Active,
            created_at: Utc::now(),
        }
    }
}

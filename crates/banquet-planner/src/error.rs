//! Error type for the Planner's own fallible operations (session-memory
//! I/O, unknown sessions). Bus-level and worker-level failures are carried
//! as `error` messages, not Rust errors — see [`crate::cycle`].

use uuid::Uuid;

/// Result type for Planner operations.
pub type Result<T> = std::result::Result<T, PlannerError>;

/// Failures from the Planner's own bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    /// The session-memory or graph store could not be read or written.
    #[error(transparent)]
    Graph(#[from] banquet_graph::GraphError),

    /// `handle_correction` was asked to fork a session memory has no record of.
    #[error("unknown session {0}")]
    UnknownSession(Uuid),
}

//! Error types for the message bus.

use thiserror::Error;

/// Result type for bus operations.
pub type Result<T> = std::result::Result<T, BusError>;

/// Failures the bus itself can report. Routing failures (unknown
/// destination, handler panic) are not errors here — per the Bus's
/// failure semantics they become `error` messages delivered to the
/// caller instead.
#[derive(Debug, Error)]
pub enum BusError {
    /// The bus's dispatch loop has shut down; no further messages can be
    /// enqueued.
    #[error("message bus is closed")]
    Closed,
}

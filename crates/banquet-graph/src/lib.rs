//! The content-addressed vendor knowledge graph, plus the three JSON-file
//! stores that back the Planner's durable state: `GraphStore`,
//! `SessionMemory`, `UserPrefsMemory`.
//!
//! All persistence here is `serde_json` + `std::fs`, not a KV store: the
//! external interface mandates plain pretty-printed JSON files as the
//! on-disk format, so every write goes through [`graph::atomic_write_json`]
//! (temp file + rename) under a mutex rather than through a database.

#![warn(missing_docs)]

mod error;
mod graph;
mod node;
mod session_memory;
mod store;
mod user_prefs;

pub use error::{GraphError, Result};
pub use graph::{Edge, Graph};
pub use node::{Completeness, Node};
pub use session_memory::{SessionMemory, SessionRecord, SessionRecordStatus};
pub use store::GraphStore;
pub use user_prefs::UserPrefsMemory;

//! A node in a category's knowledge graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Whether a main node satisfies its category's vendor-record invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completeness {
    /// Missing at least one required field.
    Partial,
    /// Every required field for the node's type is present.
    Complete,
}

/// A node, addressed by its id.
///
/// A main node's id is its canonicalized source URL; a leaf node's id is a
/// synthetic key like `capacity::60` or `price:space_rental::3500`, shared
/// across every main node that carries that exact attribute value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// `venue` / `catering` / `decor` for a main node, or an attribute-leaf
    /// type like `capacity`, `service`, `price_space_rental`.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Display name: the vendor's title for a main node, the raw value for
    /// a leaf.
    pub name: String,
    /// The full extracted record, for main nodes only; `Value::Null` for
    /// leaves.
    #[serde(default)]
    pub original_data: Value,
    /// Set only on main nodes; leaves carry `Completeness::Complete` as an
    /// unused default.
    #[serde(default = "default_completeness")]
    pub completeness: Completeness,
    /// Last time this node's data was written.
    pub timestamp: DateTime<Utc>,
}

fn default_completeness() -> Completeness {
    Completeness::Complete
}

impl Node {
    /// A new main node, seeded as partial until projection and validation
    /// decide otherwise.
    pub fn new_main(node_type: impl Into<String>, name: impl Into<String>, original_data: Value) -> Self {
        Self {
            node_type: node_type.into(),
            name: name.into(),
            original_data,
            completeness: Completeness::Partial,
            timestamp: Utc::now(),
        }
    }

    /// A new attribute-leaf node: its `name` is the raw attribute value
    /// rendered as a string.
    pub fn new_leaf(node_type: impl Into<String>, value: &Value) -> Self {
        let name = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        Self {
            node_type: node_type.into(),
            name,
            original_data: Value::Null,
            completeness: Completeness::Complete,
            timestamp: Utc::now(),
        }
    }
}

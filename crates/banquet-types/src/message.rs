//! Messages: the envelope every component exchanges over the Bus.

use crate::criteria::Criteria;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// The kind of a message, used by the Bus and Planner to route it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// A unit of work dispatched to a worker endpoint.
    Task,
    /// A worker's reply to a task.
    AgentResponse,
    /// A task failed; carries the original `task_id`.
    Error,
    /// A user's planning request.
    UserRequest,
    /// A request to fork a session and retry with adjusted criteria.
    CorrectionRequest,
    /// Immediate acknowledgment that a request was accepted.
    Acknowledgment,
    /// The completed plan for a session.
    FinalResponse,
    /// Fan-out to every endpoint except the sender.
    Broadcast,
}

/// The payload carried by a [`Message`], shaped by `kind`.
///
/// One variant per message kind, per the tagged-variant boundary design
/// (rather than a single duck-typed JSON blob): each site that builds or
/// reads a message does so against a concrete Rust shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageBody {
    /// Body of a `task` message.
    Task {
        /// The task's id, used to correlate the eventual response.
        task_id: Uuid,
        /// Task parameters (a criteria subset, possibly with correction
        /// overrides merged in).
        parameters: Value,
        /// A snapshot of the shared knowledge-graph registry, copied in
        /// by the Bus so the worker sees a consistent view.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        graph_data: Option<Value>,
    },
    /// Body of an `agent_response` message.
    AgentResponse {
        /// The task id this reply answers.
        task_id: Uuid,
        /// The worker's result payload.
        result: Value,
    },
    /// Body of an `error` message.
    Error {
        /// The task id that failed, if known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<Uuid>,
        /// Human-readable error message.
        error: String,
    },
    /// Body of a `user_request` message.
    UserRequest {
        /// The structured planning request.
        criteria: Criteria,
    },
    /// Body of a `correction_request` message.
    CorrectionRequest {
        /// The session being corrected.
        original_session_id: Uuid,
        /// Arbitrary correction payload (new criteria fragments, a
        /// conflict marker, ...).
        #[serde(flatten)]
        correction: serde_json::Map<String, Value>,
    },
    /// Body of an `acknowledgment` message.
    Acknowledgment {
        /// The task id being acknowledged, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        task_id: Option<Uuid>,
        /// Short human-readable note.
        message: String,
    },
    /// Body of a `final_response` message.
    FinalResponse {
        /// Summary belief snapshot (`completed`, `conflicts`, `used_budget`, ...).
        summary: Value,
        /// Selected result per category.
        results: Value,
        /// The session this plan belongs to.
        session_id: Uuid,
        /// Whether this plan was produced by a correction session.
        is_correction: bool,
    },
    /// Body of a `broadcast` message.
    Broadcast {
        /// Arbitrary broadcast payload.
        payload: Value,
    },
}

/// An envelope exchanged between named endpoints over the Message Bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Sending endpoint name.
    pub from: String,
    /// Destination endpoint name (ignored for broadcasts).
    pub to: String,
    /// What kind of message this is.
    pub kind: MessageKind,
    /// The session this message belongs to.
    pub session_id: Uuid,
    /// The kind-shaped payload.
    pub body: MessageBody,
}

impl Message {
    /// The `task_id` this message correlates to, if its body carries one.
    pub fn task_id(&self) -> Option<Uuid> {
        match &self.body {
            MessageBody::Task { task_id, .. } => Some(*task_id),
            MessageBody::AgentResponse { task_id, .. } => Some(*task_id),
            MessageBody::Error { task_id, .. } => *task_id,
            MessageBody::Acknowledgment { task_id, .. } => *task_id,
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_body_round_trips_without_graph_data() {
        let body = MessageBody::Task {
            task_id: Uuid::new_v4(),
            parameters: serde_json::json!({"capacity": 100}),
            graph_data: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("graph_data").is_none());
        let back: MessageBody = serde_json::from_value(json).unwrap();
        match back {
            MessageBody::Task { graph_data, .. } => assert!(graph_data.is_none()),
            _ => panic!("wrong variant"),
        }
    }
}

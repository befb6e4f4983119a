//! The Planner: the BDI core's session lifecycle and its single bus
//! endpoint. Everything cycle-shaped lives in [`crate::cycle`]; this module
//! owns the shared infrastructure a cycle borrows and the entry points
//! (`user_request`, `correction_request`) that spawn one.

use crate::cycle::SessionCycle;
use crate::error::{PlannerError, Result};
use banquet_budget::BudgetDistributor;
use banquet_bus::{handler_fn, MessageBus};
use banquet_graph::{GraphStore, SessionMemory, SessionRecordStatus};
use banquet_retrieval::PlannerRetrieval;
use banquet_types::{Criteria, Message, MessageBody, MessageKind};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// The BDI planner. Registers itself on the bus as the `"Planner"`
/// endpoint and, for every accepted `user_request` / `correction_request`,
/// spawns a [`SessionCycle`] that runs the sense-deliberate-plan-act loop
/// to completion and posts the resulting `final_response` back onto the
/// bus.
pub struct Planner {
    bus: MessageBus,
    session_memory: Arc<SessionMemory>,
    graphs: Arc<GraphStore>,
    budget: Arc<BudgetDistributor>,
    retrieval: Arc<PlannerRetrieval>,
    task_timeout: Duration,
}

impl Planner {
    /// Assemble a Planner around its shared collaborators. Does not yet
    /// register the bus endpoint — call [`Planner::register`] once the
    /// returned `Arc` exists.
    pub fn new(
        bus: MessageBus,
        session_memory: Arc<SessionMemory>,
        graphs: Arc<GraphStore>,
        budget: Arc<BudgetDistributor>,
        retrieval: Arc<PlannerRetrieval>,
        task_timeout: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            bus,
            session_memory,
            graphs,
            budget,
            retrieval,
            task_timeout,
        })
    }

    pub(crate) fn bus(&self) -> &MessageBus {
        &self.bus
    }

    pub(crate) fn session_memory(&self) -> &SessionMemory {
        &self.session_memory
    }

    pub(crate) fn retrieval(&self) -> &PlannerRetrieval {
        &self.retrieval
    }

    pub(crate) fn task_timeout(&self) -> Duration {
        self.task_timeout
    }

    /// Also exposed for the CLI's budget-explain surface, which shares the
    /// Planner's collaborators rather than constructing its own.
    pub fn budget(&self) -> &BudgetDistributor {
        &self.budget
    }

    /// The shared knowledge graphs this Planner's workers search against.
    pub fn graphs(&self) -> &Arc<GraphStore> {
        &self.graphs
    }

    /// Register the `"Planner"` endpoint on the bus. Worker replies never
    /// reach this handler — they're correlated directly by
    /// `send_and_wait`'s `task_id` matching — so this only routes
    /// `user_request` and `correction_request` messages.
    pub fn register(self: &Arc<Self>) {
        let this = self.clone();
        self.bus.register(
            "Planner",
            handler_fn(move |msg| {
                let this = this.clone();
                async move { this.clone().receive(msg).await }
            }),
        );
    }

    async fn receive(self: Arc<Self>, msg: Message) -> Option<Message> {
        match (&msg.kind, &msg.body) {
            (MessageKind::UserRequest, MessageBody::UserRequest { criteria }) => {
                Some(self.handle_user_request(msg.session_id, msg.from.clone(), criteria.clone()).await)
            }
            (MessageKind::CorrectionRequest, MessageBody::CorrectionRequest { original_session_id, correction }) => {
                Some(
                    self.handle_correction_request(*original_session_id, msg.from.clone(), correction.clone())
                        .await,
                )
            }
            _ => {
                tracing::debug!(kind = ?msg.kind, "Planner endpoint ignoring a message it doesn't route");
                None
            }
        }
    }

    /// Create a brand-new, active session for `user_id`.
    pub fn create_session(&self, user_id: &str) -> Result<Uuid> {
        let session_id = Uuid::new_v4();
        self.session_memory.create(session_id, user_id)?;
        Ok(session_id)
    }

    /// Fork `original_session_id` into a new session for a correction
    /// pass. Per the concurrency model, a correction never mutates the
    /// original session's record; it starts a fresh one and copies
    /// forward every belief the original had settled. The `conflicts`
    /// counter here is a running total, not a per-field marker, so there
    /// is no way to selectively drop "the beliefs in conflict" — every
    /// non-null belief from the original carries forward, and the new
    /// session's own cycle is free to overwrite any of them.
    pub fn handle_correction(&self, original_session_id: Uuid, user_id: &str) -> Result<Uuid> {
        let original = self
            .session_memory
            .get(original_session_id)
            .ok_or(PlannerError::UnknownSession(original_session_id))?;

        let new_session_id = Uuid::new_v4();
        self.session_memory.create(new_session_id, user_id)?;

        let mut beliefs = original.beliefs.clone();
        beliefs.conflicts += 1;
        self.session_memory.update_beliefs(new_session_id, beliefs)?;

        Ok(new_session_id)
    }

    async fn handle_user_request(self: &Arc<Self>, session_id: Uuid, _from: String, criteria: Criteria) -> Message {
        if self.session_memory.is_archived(session_id) {
            return error_message(session_id, "session is archived and no longer accepts requests".to_string());
        }
        if let Err(e) = criteria.validate() {
            return error_message(session_id, e.to_string());
        }
        let user_id = match self.session_memory.get(session_id) {
            Some(record) => record.user_id,
            None => {
                if let Err(e) = self.session_memory.create(session_id, "unknown") {
                    return error_message(session_id, e.to_string());
                }
                "unknown".to_string()
            }
        };

        let this = self.clone();
        tokio::spawn(async move {
            let cycle = SessionCycle::new(&this, session_id, user_id, criteria, false);
            let final_msg = cycle.run().await;
            this.bus.send(final_msg);
        });

        acknowledgment(session_id, "user_request accepted; planning in progress")
    }

    async fn handle_correction_request(
        self: &Arc<Self>,
        original_session_id: Uuid,
        user_id: String,
        correction: serde_json::Map<String, Value>,
    ) -> Message {
        let new_session_id = match self.handle_correction(original_session_id, &user_id) {
            Ok(id) => id,
            Err(e) => return error_message(original_session_id, e.to_string()),
        };

        let record = self.session_memory.get(new_session_id).expect("just created");
        let mut criteria = match record.beliefs.criteria {
            Some(c) => c,
            None => return error_message(new_session_id, "original session has no criteria to correct".to_string()),
        };

        if let Some(overrides) = correction.get("criteria") {
            match serde_json::from_value::<Criteria>(overrides.clone()) {
                Ok(overridden) => criteria = overridden,
                Err(e) => return error_message(new_session_id, format!("malformed criteria override: {e}")),
            }
        }

        let this = self.clone();
        tokio::spawn(async move {
            let cycle = SessionCycle::new(&this, new_session_id, user_id, criteria, true);
            let final_msg = cycle.run().await;
            this.bus.send(final_msg);
        });

        acknowledgment(new_session_id, "correction_request accepted; replanning in progress")
    }
}

fn acknowledgment(session_id: Uuid, message: &str) -> Message {
    Message {
        from: "Planner".to_string(),
        to: "user".to_string(),
        kind: MessageKind::Acknowledgment,
        session_id,
        body: MessageBody::Acknowledgment {
            task_id: None,
            message: message.to_string(),
        },
    }
}

fn error_message(session_id: Uuid, error: String) -> Message {
    Message {
        from: "Planner".to_string(),
        to: "user".to_string(),
        kind: MessageKind::Error,
        session_id,
        body: MessageBody::Error { task_id: None, error },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banquet_budget::NullWeightInferenceClient;
    use banquet_graph::UserPrefsMemory;
    use banquet_retrieval::PlannerRetrieval;
    use serde_json::json;

    fn planner(dir: &std::path::Path) -> Arc<Planner> {
        let bus = MessageBus::new();
        let session_memory = Arc::new(SessionMemory::load(dir.join("session_memory.json")).unwrap());
        let graphs = Arc::new(GraphStore::load(dir.join("graphs")).unwrap());
        let user_prefs = Arc::new(UserPrefsMemory::load(dir.join("user_pref_memory.json")).unwrap());
        let budget = Arc::new(BudgetDistributor::new(Arc::new(NullWeightInferenceClient), user_prefs));
        let retrieval = Arc::new(PlannerRetrieval::load(dir.join("planner_retrieval")).unwrap());
        Planner::new(bus, session_memory, graphs, budget, retrieval, Duration::from_millis(200))
    }

    #[test]
    fn create_session_is_immediately_visible_in_session_memory() {
        let dir = tempfile::tempdir().unwrap();
        let p = planner(dir.path());
        let session_id = p.create_session("user-1").unwrap();
        assert!(p.session_memory.get(session_id).is_some());
    }

    #[test]
    fn handle_correction_rejects_an_unknown_session() {
        let dir = tempfile::tempdir().unwrap();
        let p = planner(dir.path());
        let err = p.handle_correction(Uuid::new_v4(), "user-1").unwrap_err();
        assert!(matches!(err, PlannerError::UnknownSession(_)));
    }

    #[test]
    fn handle_correction_copies_forward_the_original_criteria() {
        let dir = tempfile::tempdir().unwrap();
        let p = planner(dir.path());
        let original = p.create_session("user-1").unwrap();
        let mut beliefs = p.session_memory.get(original).unwrap().beliefs;
        beliefs.criteria = Some(
            serde_json::from_value(json!({"total_budget": 10_000, "guest_count": 50, "style": "standard"})).unwrap(),
        );
        p.session_memory.update_beliefs(original, beliefs).unwrap();

        let corrected = p.handle_correction(original, "user-1").unwrap();
        let record = p.session_memory.get(corrected).unwrap();
        assert_eq!(record.beliefs.criteria.unwrap().total_budget, 10_000);
        assert_eq!(record.beliefs.conflicts, 1);
    }
}

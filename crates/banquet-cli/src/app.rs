//! Wires the Bus, Planner, Budget Distributor, Category Workers and
//! Knowledge Graph together into one running system, and provides the
//! request/response plumbing the CLI commands submit through.

use crate::config::AppConfig;
use banquet_budget::{BudgetDistributor, NullWeightInferenceClient};
use banquet_bus::{handler_fn, MessageBus};
use banquet_graph::{GraphStore, SessionMemory, UserPrefsMemory};
use banquet_planner::{Planner, WorkerEndpoints};
use banquet_retrieval::{CateringRetrieval, DecorRetrieval, PlannerRetrieval, VenueRetrieval};
use banquet_types::{Criteria, Message, MessageBody, MessageKind};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// The fully wired system a CLI invocation talks to.
pub struct System {
    bus: MessageBus,
    planner: Arc<Planner>,
}

impl System {
    /// Load every durable store under `config.data_dir`, register the
    /// worker and Planner bus endpoints, and return the running system.
    /// No network or LLM collaborators are wired in: the weight inference
    /// client and the coverage crawler both run in their null/degraded
    /// mode, matching how the core behaves with no external services
    /// configured.
    pub fn build(config: &AppConfig) -> anyhow::Result<Self> {
        let data_dir = &config.data_dir;
        let bus = MessageBus::new();

        let graphs = Arc::new(GraphStore::load(data_dir.join("graphs"))?);
        let session_memory = Arc::new(SessionMemory::load(data_dir.join("session_memory.json"))?);
        let user_prefs = Arc::new(UserPrefsMemory::load(data_dir.join("user_pref_memory.json"))?);
        let budget = Arc::new(BudgetDistributor::new(Arc::new(NullWeightInferenceClient), user_prefs));
        let retrieval = Arc::new(PlannerRetrieval::load(data_dir.join("planner_retrieval"))?);
        let venue_retrieval = Arc::new(VenueRetrieval::load(data_dir.join("venue_retrieval"))?);
        let catering_retrieval = Arc::new(CateringRetrieval::load(data_dir.join("catering_retrieval"))?);
        let decor_retrieval = Arc::new(DecorRetrieval::load(data_dir.join("decor_retrieval"))?);

        bus.set_shared_data("graphs", graphs.snapshot());

        let endpoints = Arc::new(WorkerEndpoints::new(
            graphs.clone(),
            venue_retrieval,
            catering_retrieval,
            decor_retrieval,
            budget.clone(),
            None,
        ));
        endpoints.register(&bus);

        let planner = Planner::new(
            bus.clone(),
            session_memory,
            graphs,
            budget,
            retrieval,
            Duration::from_millis(config.task_timeout_ms),
        );
        planner.register();

        Ok(Self { bus, planner })
    }

    /// Create a session, submit its planning criteria, and wait for the
    /// `final_response` the Planner eventually posts back to the `"user"`
    /// endpoint.
    pub async fn plan(&self, user_id: &str, criteria: Criteria) -> anyhow::Result<Message> {
        criteria.validate()?;
        let session_id = self.planner.create_session(user_id)?;
        self.submit(
            session_id,
            Message {
                from: "user".to_string(),
                to: "Planner".to_string(),
                kind: MessageKind::UserRequest,
                session_id,
                body: MessageBody::UserRequest { criteria },
            },
        )
        .await
    }

    /// Fork `original_session_id` into a correction session carrying the
    /// given override payload, and wait for its `final_response`.
    pub async fn correct(
        &self,
        original_session_id: Uuid,
        user_id: &str,
        overrides: serde_json::Map<String, serde_json::Value>,
    ) -> anyhow::Result<Message> {
        self.submit(
            original_session_id,
            Message {
                from: "user".to_string(),
                to: "Planner".to_string(),
                kind: MessageKind::CorrectionRequest,
                session_id: original_session_id,
                body: MessageBody::CorrectionRequest {
                    original_session_id,
                    correction: overrides,
                },
            },
        )
        .await
    }

    /// Sweep every category's graph for nodes worth repairing and persist
    /// whichever updates clear the enrichment engine's improvement bar.
    /// Returns the number of nodes updated per category.
    pub async fn retroactive_enrich(&self) -> anyhow::Result<serde_json::Value> {
        let engine = banquet_quality::EnrichmentEngine::new(Arc::new(banquet_quality::NullExtractionClient));
        let graphs = self.planner.graphs();
        let mut summary = serde_json::Map::new();

        for category in banquet_types::Category::ALL {
            let records = graphs.with_graph(category, |graph| {
                graph
                    .query()
                    .into_iter()
                    .map(|(id, node)| (id.clone(), node.original_data.clone()))
                    .collect::<Vec<_>>()
            });
            let updates = engine.retroactive_sweep(records, category).await;
            let updated = updates.len();

            graphs.with_graph(category, |graph| {
                for (id, record) in updates {
                    if let Some(node) = graph.node_mut(&id) {
                        node.original_data = record;
                        node.timestamp = chrono::Utc::now();
                    }
                }
            });
            graphs.save(category)?;
            summary.insert(category.to_string(), serde_json::json!(updated));
        }

        Ok(serde_json::Value::Object(summary))
    }

    /// Register a fresh `"user"` endpoint around an mpsc channel, send
    /// `request`, and wait for the first `final_response` or `error` that
    /// arrives for it. The immediate `acknowledgment` is logged and
    /// skipped — only a terminal message ends the wait.
    async fn submit(&self, session_id: Uuid, request: Message) -> anyhow::Result<Message> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.bus.register(
            "user",
            handler_fn(move |msg| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(msg);
                    None
                }
            }),
        );

        self.bus.send(request);

        while let Some(msg) = rx.recv().await {
            if msg.session_id != session_id {
                continue;
            }
            match msg.kind {
                MessageKind::Acknowledgment => {
                    if let MessageBody::Acknowledgment { message, .. } = &msg.body {
                        tracing::info!(%session_id, %message, "planner acknowledged the request");
                    }
                }
                MessageKind::FinalResponse | MessageKind::Error => return Ok(msg),
                _ => {}
            }
        }

        anyhow::bail!("message bus closed before a final response arrived for session {session_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(dir: &std::path::Path) -> AppConfig {
        AppConfig {
            data_dir: dir.to_path_buf(),
            task_timeout_ms: 2_000,
            log_level: "error".to_string(),
        }
    }

    #[tokio::test]
    async fn plan_runs_to_a_final_response_against_empty_graphs() {
        let dir = tempfile::tempdir().unwrap();
        let system = System::build(&test_config(dir.path())).unwrap();

        let criteria: Criteria = serde_json::from_value(serde_json::json!({
            "total_budget": 20_000,
            "guest_count": 80,
            "style": "standard",
            "venue": {"mandatory": [], "capacity": 80},
        }))
        .unwrap();

        let response = system.plan("user-1", criteria).await.unwrap();
        assert_eq!(response.kind, MessageKind::FinalResponse);
    }

    #[tokio::test]
    async fn retroactive_enrich_reports_zero_updates_on_empty_graphs() {
        let dir = tempfile::tempdir().unwrap();
        let system = System::build(&test_config(dir.path())).unwrap();

        let summary = system.retroactive_enrich().await.unwrap();
        assert_eq!(summary["venue"], 0);
        assert_eq!(summary["catering"], 0);
        assert_eq!(summary["decor"], 0);
    }
}

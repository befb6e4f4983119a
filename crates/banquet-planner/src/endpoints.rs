//! Registers the `budget_distribution` / `venue_search` / `catering_search`
//! / `decor_search` Bus endpoints backing the Category Workers and the
//! Budget Distributor.
//!
//! Each handler constructs its worker fresh per call (workers are a thin,
//! cheaply-built wrapper around a borrowed retrieval layer), runs it under
//! the matching `GraphStore` mutex, and maps the outcome to an
//! `agent_response` or `error` reply.

use crate::wire::{BudgetTaskParams, SearchTaskParams};
use banquet_bus::{handler_fn, MessageBus};
use banquet_budget::BudgetDistributor;
use banquet_graph::GraphStore;
use banquet_quality::{EnrichmentEngine, ExtractionClient, NullExtractionClient};
use banquet_retrieval::{CateringRetrieval, DecorRetrieval, VenueRetrieval};
use banquet_types::{Category, Message, MessageBody, MessageKind};
use banquet_workers::{CateringWorker, CoverageCrawler, DecorWorker, NullCoverageCrawler, VenueWorker};
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Everything a worker/budget endpoint handler needs, bundled so it can be
/// cloned cheaply into each registered closure.
pub struct WorkerEndpoints {
    graphs: Arc<GraphStore>,
    venue_retrieval: Arc<VenueRetrieval>,
    catering_retrieval: Arc<CateringRetrieval>,
    decor_retrieval: Arc<DecorRetrieval>,
    crawler: Arc<dyn CoverageCrawler>,
    quality: EnrichmentEngine,
    budget: Arc<BudgetDistributor>,
}

impl WorkerEndpoints {
    /// Build the endpoint bundle. `crawler` defaults to
    /// [`NullCoverageCrawler`] and `extractor` to [`NullExtractionClient`]
    /// when the respective external pipeline isn't wired up.
    pub fn new(
        graphs: Arc<GraphStore>,
        venue_retrieval: Arc<VenueRetrieval>,
        catering_retrieval: Arc<CateringRetrieval>,
        decor_retrieval: Arc<DecorRetrieval>,
        budget: Arc<BudgetDistributor>,
        crawler: Option<Arc<dyn CoverageCrawler>>,
    ) -> Self {
        Self::with_extractor(graphs, venue_retrieval, catering_retrieval, decor_retrieval, budget, crawler, None)
    }

    /// As [`WorkerEndpoints::new`], additionally overriding the enrichment
    /// engine's extraction/search provider.
    pub fn with_extractor(
        graphs: Arc<GraphStore>,
        venue_retrieval: Arc<VenueRetrieval>,
        catering_retrieval: Arc<CateringRetrieval>,
        decor_retrieval: Arc<DecorRetrieval>,
        budget: Arc<BudgetDistributor>,
        crawler: Option<Arc<dyn CoverageCrawler>>,
        extractor: Option<Arc<dyn ExtractionClient>>,
    ) -> Self {
        Self {
            graphs,
            venue_retrieval,
            catering_retrieval,
            decor_retrieval,
            budget,
            crawler: crawler.unwrap_or_else(|| Arc::new(NullCoverageCrawler)),
            quality: EnrichmentEngine::new(extractor.unwrap_or_else(|| Arc::new(NullExtractionClient))),
        }
    }

    /// Register all four endpoints on `bus`.
    pub fn register(self: Arc<Self>, bus: &MessageBus) {
        for category in Category::ALL {
            let this = self.clone();
            bus.register(
                category.search_task_name(),
                handler_fn(move |msg| {
                    let this = this.clone();
                    async move { this.handle_search(category, msg).await }
                }),
            );
        }

        let this = self.clone();
        bus.register(
            "budget_distribution",
            handler_fn(move |msg| {
                let this = this.clone();
                async move { this.handle_budget(msg) }
            }),
        );
    }

    async fn handle_search(&self, category: Category, msg: Message) -> Option<Message> {
        let (task_id, parameters) = task_body(&msg)?;
        let outcome = self.run_search(category, &parameters).await;
        Some(reply(&msg, task_id, outcome))
    }

    fn handle_budget(&self, msg: Message) -> Option<Message> {
        let (task_id, parameters) = task_body(&msg)?;
        let outcome = self.run_budget(&parameters);
        Some(reply(&msg, task_id, outcome))
    }

    async fn run_search(&self, category: Category, parameters: &Value) -> std::result::Result<Value, String> {
        let params: SearchTaskParams = serde_json::from_value(parameters.clone()).map_err(|e| e.to_string())?;
        let crawler = self.crawler.as_ref();

        // Coverage-build first, under the graph lock, so enrichment and
        // search both see whatever the crawler ingested.
        self.graphs.with_graph(category, |graph| {
            banquet_workers::coverage::ensure_coverage(category, graph, &params.seed_urls, crawler);
        });

        // Gap-filling makes network calls, so it runs outside any graph
        // lock: each candidate is read, enriched, then written back under
        // its own short lock acquisition.
        let candidates = self.graphs.with_graph(category, |graph| {
            graph
                .query()
                .into_iter()
                .filter(|(_, node)| banquet_quality::validate(&node.original_data, category).needs_enrichment)
                .map(|(id, node)| (id.clone(), node.original_data.clone()))
                .collect::<Vec<_>>()
        });
        for (id, data) in candidates {
            let outcome = self.quality.enrich(data, category).await;
            if !outcome.applied {
                continue;
            }
            self.graphs.with_graph(category, |graph| {
                if let Some(node) = graph.node_mut(&id) {
                    node.original_data = outcome.record;
                    node.completeness = if outcome.after.complete {
                        banquet_graph::Completeness::Complete
                    } else {
                        banquet_graph::Completeness::Partial
                    };
                    node.timestamp = chrono::Utc::now();
                }
            });
        }

        let results = self.graphs.with_graph(category, |graph| match category {
            Category::Venue => VenueWorker::new(&self.venue_retrieval).search(&params.criteria, &params.seed_urls, graph, crawler),
            Category::Catering => {
                CateringWorker::new(&self.catering_retrieval).search(&params.criteria, &params.seed_urls, graph, crawler)
            }
            Category::Decor => DecorWorker::new(&self.decor_retrieval).search(&params.criteria, &params.seed_urls, graph, crawler),
        });
        if let Err(e) = self.graphs.save(category) {
            tracing::warn!(%category, error = %e, "failed to persist graph after search");
        }
        serde_json::to_value(results).map_err(|e| e.to_string())
    }

    fn run_budget(&self, parameters: &Value) -> std::result::Result<Value, String> {
        let params: BudgetTaskParams = serde_json::from_value(parameters.clone()).map_err(|e| e.to_string())?;
        let distribution = self
            .budget
            .distribute(&params.user_id, params.total_budget, &params.criteria, &self.graphs)
            .map_err(|e| e.to_string())?;
        serde_json::to_value(distribution).map_err(|e| e.to_string())
    }
}

fn task_body(msg: &Message) -> Option<(Uuid, Value)> {
    match &msg.body {
        MessageBody::Task { task_id, parameters, .. } => Some((*task_id, parameters.clone())),
        _ => None,
    }
}

fn reply(msg: &Message, task_id: Uuid, outcome: std::result::Result<Value, String>) -> Message {
    match outcome {
        Ok(result) => Message {
            from: msg.to.clone(),
            to: msg.from.clone(),
            kind: MessageKind::AgentResponse,
            session_id: msg.session_id,
            body: MessageBody::AgentResponse { task_id, result },
        },
        Err(error) => Message {
            from: msg.to.clone(),
            to: msg.from.clone(),
            kind: MessageKind::Error,
            session_id: msg.session_id,
            body: MessageBody::Error { task_id: Some(task_id), error },
        },
    }
}

//! Wires the quality validator and enrichment engine into a worker's
//! coverage step: once the crawler (if any) has run, every main node the
//! validator flags as worth repairing gets a best-effort enrichment pass
//! before filtering and scoring see the graph.

use banquet_graph::{Completeness, Graph};
use banquet_quality::{validate, EnrichmentEngine};
use banquet_types::Category;
use serde_json::Value;

/// Enrich every main node of `category` that [`validate`] flags as
/// `needs_enrichment`, writing successful repairs back into `graph` in
/// place. Returns the number of nodes actually changed.
pub async fn fill_quality_gaps(graph: &mut Graph, category: Category, engine: &EnrichmentEngine) -> usize {
    let candidates: Vec<(String, Value)> = graph
        .query()
        .into_iter()
        .filter(|(_, node)| validate(&node.original_data, category).needs_enrichment)
        .map(|(id, node)| (id.clone(), node.original_data.clone()))
        .collect();

    let mut applied = 0;
    for (id, data) in candidates {
        let outcome = engine.enrich(data, category).await;
        if !outcome.applied {
            continue;
        }
        if let Some(node) = graph.node_mut(&id) {
            node.original_data = outcome.record;
            node.completeness = if outcome.after.complete { Completeness::Complete } else { Completeness::Partial };
            node.timestamp = chrono::Utc::now();
        }
        applied += 1;
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use banquet_quality::NullExtractionClient;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn repairs_an_incomplete_node_with_a_usable_title() {
        let mut graph = Graph::new(Category::Venue);
        graph
            .insert(json!({
                "url": "not-a-real-url",
                "title": "The Grand Hall",
                "price": {"space_rental": 3500},
            }))
            .unwrap();

        let engine = EnrichmentEngine::new(Arc::new(NullExtractionClient));
        let applied = fill_quality_gaps(&mut graph, Category::Venue, &engine).await;

        assert_eq!(applied, 1);
        let node = graph.node("not-a-real-url").unwrap();
        assert_eq!(node.original_data["capacity"], json!(150));
    }

    #[tokio::test]
    async fn leaves_a_complete_fresh_node_untouched() {
        let mut graph = Graph::new(Category::Venue);
        graph
            .insert(json!({
                "url": "https://venues.example/grand-hall",
                "title": "The Grand Hall",
                "capacity": 120,
                "price": {"space_rental": 3500},
                "location": "123 Main Street",
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }))
            .unwrap();

        let engine = EnrichmentEngine::new(Arc::new(NullExtractionClient));
        let applied = fill_quality_gaps(&mut graph, Category::Venue, &engine).await;
        assert_eq!(applied, 0);
    }
}

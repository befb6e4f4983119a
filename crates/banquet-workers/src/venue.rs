//! The venue worker.

use crate::coverage::{self, CoverageCrawler};
use crate::rules;
use crate::scoring;
use banquet_graph::Graph;
use banquet_retrieval::venue::VenueRetrieval;
use banquet_types::{Category, Criteria};
use serde_json::Value;

fn as_str_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Count-threshold inference: more services/supported events/atmosphere
/// descriptors suggests a more capable, flexible venue.
fn inference_score(data: &Value) -> f64 {
    let signals: [(&str, usize, usize); 3] = [
        ("services", 5, 3),
        ("supported_events", 3, 2),
        ("atmosphere", 4, 2),
    ];

    let mut score = 0.0;
    let mut max_score = 0.0;
    for (field, full, half) in signals {
        let values = as_str_list(data.get(field));
        if values.is_empty() {
            continue;
        }
        max_score += 1.0;
        if values.len() >= full {
            score += 1.0;
        } else if values.len() >= half {
            score += 0.5;
        }
    }
    if max_score > 0.0 {
        score / max_score
    } else {
        0.0
    }
}

const PREMIUM_SERVICE_INDICATORS: &[&str] = &["bar", "dance floor", "dressing room", "event coordinator", "catering"];
const PREMIUM_EVENT_INDICATORS: &[&str] = &["wedding ceremony", "wedding reception", "rehearsal dinner"];

fn bonus_score(data: &Value) -> f64 {
    let services = as_str_list(data.get("services"));
    let events = as_str_list(data.get("supported_events"));

    let mut bonus = 0.0;
    let mut max_bonus = 0.0;

    if !services.is_empty() {
        max_bonus += 1.0;
        let found = services
            .iter()
            .filter(|s| PREMIUM_SERVICE_INDICATORS.iter().any(|p| s.to_lowercase().contains(p)))
            .count();
        bonus += (found as f64 / PREMIUM_SERVICE_INDICATORS.len() as f64).min(1.0);
    }
    if !events.is_empty() {
        max_bonus += 1.0;
        let found = events
            .iter()
            .filter(|e| PREMIUM_EVENT_INDICATORS.iter().any(|p| e.to_lowercase().contains(p)))
            .count();
        bonus += (found as f64 / PREMIUM_EVENT_INDICATORS.len() as f64).min(1.0);
    }

    if max_bonus > 0.0 {
        bonus / max_bonus
    } else {
        0.0
    }
}

fn style_alignment(data: &Value, criteria: &Criteria, retrieval: &VenueRetrieval) -> f64 {
    let budget = criteria.venue.as_ref().and_then(|v| v.get("price")).and_then(Value::as_f64).unwrap_or(criteria.total_budget as f64);
    let rec = retrieval.recommend(budget, criteria.guest_count, &criteria.style);

    let components = [
        scoring::overlap_ratio(&rec.atmosphere, data.get("atmosphere").unwrap_or(&Value::Null)),
        scoring::overlap_ratio(&rec.venue_type, data.get("venue_type").unwrap_or(&Value::Null)),
        scoring::overlap_ratio(&rec.services, data.get("services").unwrap_or(&Value::Null)),
        scoring::overlap_ratio(&rec.supported_events, data.get("supported_events").unwrap_or(&Value::Null)),
    ];
    components.iter().sum::<f64>() / components.len() as f64
}

/// Searches the venue graph, filtering by mandatory criteria and ranking
/// survivors by the shared weighted score.
pub struct VenueWorker<'a> {
    retrieval: &'a VenueRetrieval,
}

impl<'a> VenueWorker<'a> {
    /// Build a worker around the venue retrieval layer.
    pub fn new(retrieval: &'a VenueRetrieval) -> Self {
        Self { retrieval }
    }

    /// Run the shared worker contract against `graph`, driving `crawler` if
    /// coverage is insufficient. Returns up to 50 ranked candidates.
    pub fn search(
        &self,
        criteria: &Criteria,
        seed_urls: &[String],
        graph: &mut Graph,
        crawler: &dyn CoverageCrawler,
    ) -> Vec<Value> {
        coverage::ensure_coverage(Category::Venue, graph, seed_urls, crawler);

        let venue_criteria = criteria.venue.clone().unwrap_or_default();
        let predicates = rules::compile(&venue_criteria);

        let mut scored: Vec<(Value, f64)> = graph
            .query()
            .into_iter()
            .map(|(_, node)| node.original_data.clone())
            .filter(|data| rules::passes(&predicates, data))
            .map(|data| {
                let optional = scoring::optional_field_score(&data, &venue_criteria);
                let inference = inference_score(&data);
                let style = style_alignment(&data, criteria, self.retrieval);
                let bonus = bonus_score(&data);
                let score = scoring::combine(optional, inference, style, bonus);
                (data, score)
            })
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(50).map(|(data, _)| data).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::NullCoverageCrawler;
    use serde_json::json;

    fn retrieval() -> VenueRetrieval {
        let dir = tempfile::tempdir().unwrap();
        VenueRetrieval::load(dir.path().to_path_buf()).unwrap()
    }

    fn criteria() -> Criteria {
        serde_json::from_value(json!({
            "total_budget": 30000,
            "guest_count": 150,
            "style": "classic",
            "venue": {"mandatory": ["capacity"], "capacity": 100},
        }))
        .unwrap()
    }

    #[test]
    fn filters_out_candidates_failing_mandatory_capacity() {
        let mut graph = Graph::new(Category::Venue);
        graph
            .insert(json!({"url": "https://v.example/small", "title": "Small Hall", "capacity": 50}))
            .unwrap();
        graph
            .insert(json!({"url": "https://v.example/big", "title": "Big Hall", "capacity": 200, "services": ["bar", "valet"]}))
            .unwrap();

        let retrieval = retrieval();
        let worker = VenueWorker::new(&retrieval);
        let results = worker.search(&criteria(), &[], &mut graph, &NullCoverageCrawler);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["title"], "Big Hall");
    }

    #[test]
    fn empty_graph_returns_an_empty_list_not_an_error() {
        let mut graph = Graph::new(Category::Venue);
        let retrieval = retrieval();
        let worker = VenueWorker::new(&retrieval);
        let results = worker.search(&criteria(), &[], &mut graph, &NullCoverageCrawler);
        assert!(results.is_empty());
    }
}

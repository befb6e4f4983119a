//! The decor worker.

use crate::coverage::{self, CoverageCrawler};
use crate::rules;
use crate::scoring;
use banquet_graph::Graph;
use banquet_retrieval::decor::DecorRetrieval;
use banquet_types::{Category, Criteria};
use serde_json::Value;

fn as_str_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// More pre-wedding services suggests quality, more floral arrangement
/// types suggests variety, more day-of services suggests flexibility, more
/// arrangement styles suggests specialization.
fn inference_score(data: &Value) -> f64 {
    let signals: [(&str, usize, usize); 4] = [
        ("pre_wedding_services", 4, 2),
        ("floral_arrangements", 8, 4),
        ("day_of_services", 4, 2),
        ("arrangement_styles", 3, 2),
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

const PREMIUM_INDICATORS: &[&str] = &["full-service", "luxury", "premium", "exclusive", "specialty", "high-end", "boutique"];

fn bonus_score(data: &Value) -> f64 {
    let service_levels = as_str_list(data.get("service_levels"));
    let description = data.get("description").and_then(Value::as_str).unwrap_or("").to_lowercase();

    if service_levels.is_empty() && description.is_empty() {
        return 0.0;
    }

    let mut hits = service_levels
        .iter()
        .filter(|s| PREMIUM_INDICATORS.iter().any(|p| s.to_lowercase().contains(p)))
        .count();
    hits += PREMIUM_INDICATORS.iter().filter(|p| description.contains(*p)).count();
    (hits as f64 / PREMIUM_INDICATORS.len() as f64).min(1.0)
}

fn style_alignment(data: &Value, criteria: &Criteria, retrieval: &DecorRetrieval) -> f64 {
    let rec = retrieval.recommend(&criteria.style);
    let components = [
        scoring::overlap_ratio(&rec.service_levels, data.get("service_levels").unwrap_or(&Value::Null)),
        scoring::overlap_ratio(&rec.arrangement_styles, data.get("arrangement_styles").unwrap_or(&Value::Null)),
        scoring::overlap_ratio(&rec.floral_arrangements, data.get("floral_arrangements").unwrap_or(&Value::Null)),
    ];
    components.iter().sum::<f64>() / components.len() as f64
}

/// Searches the decor graph, filtering by mandatory criteria and ranking
/// survivors by the shared weighted score.
pub struct DecorWorker<'a> {
    retrieval: &'a DecorRetrieval,
}

impl<'a> DecorWorker<'a> {
    /// Build a worker around the decor retrieval layer.
    pub fn new(retrieval: &'a DecorRetrieval) -> Self {
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
        coverage::ensure_coverage(Category::Decor, graph, seed_urls, crawler);

        let decor_criteria = criteria.decor.clone().unwrap_or_default();
        let predicates = rules::compile(&decor_criteria);

        let mut scored: Vec<(Value, f64)> = graph
            .query()
            .into_iter()
            .map(|(_, node)| node.original_data.clone())
            .filter(|data| rules::passes(&predicates, data))
            .map(|data| {
                let optional = scoring::optional_field_score(&data, &decor_criteria);
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

    fn retrieval() -> DecorRetrieval {
        let dir = tempfile::tempdir().unwrap();
        DecorRetrieval::load(dir.path().to_path_buf()).unwrap()
    }

    fn criteria() -> Criteria {
        serde_json::from_value(json!({
            "total_budget": 8000,
            "guest_count": 150,
            "style": "luxury",
            "decor": {"mandatory": ["floral_arrangements"], "floral_arrangements": ["roses"]},
        }))
        .unwrap()
    }

    #[test]
    fn filters_out_candidates_missing_mandatory_florals() {
        let mut graph = Graph::new(Category::Decor);
        graph
            .insert(json!({"url": "https://d.example/a", "title": "Bloom Co", "floral_arrangements": ["Roses", "Peonies"]}))
            .unwrap();
        graph
            .insert(json!({"url": "https://d.example/b", "title": "Cactus Co", "floral_arrangements": ["Succulents"]}))
            .unwrap();

        let retrieval = retrieval();
        let worker = DecorWorker::new(&retrieval);
        let results = worker.search(&criteria(), &[], &mut graph, &NullCoverageCrawler);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["title"], "Bloom Co");
    }

    #[test]
    fn ranking_prefers_the_higher_scoring_candidate() {
        let mut graph = Graph::new(Category::Decor);
        graph
            .insert(json!({
                "url": "https://d.example/a", "title": "Basic",
                "floral_arrangements": ["roses"], "service_levels": ["Setup"],
            }))
            .unwrap();
        graph
            .insert(json!({
                "url": "https://d.example/b", "title": "Full Service",
                "floral_arrangements": ["roses", "peonies", "orchids"],
                "service_levels": ["Full-Service Floral Design", "Event Coordination", "Post-Event Teardown"],
            }))
            .unwrap();

        let retrieval = retrieval();
        let worker = DecorWorker::new(&retrieval);
        let results = worker.search(&criteria(), &[], &mut graph, &NullCoverageCrawler);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["title"], "Full Service");
    }
}

//! The catering worker.

use crate::coverage::{self, CoverageCrawler};
use crate::rules;
use crate::scoring;
use banquet_graph::Graph;
use banquet_retrieval::catering::CateringRetrieval;
use banquet_types::{Category, Criteria};
use serde_json::Value;

fn as_str_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// More services suggests quality, more dietary options suggests
/// flexibility, more cuisines suggests variety, a liquor license suggests
/// professionalism.
fn inference_score(data: &Value) -> f64 {
    let mut score = 0.0;
    let mut max_score = 0.0;

    let services = as_str_list(data.get("services"));
    if !services.is_empty() {
        max_score += 1.0;
        score += if services.len() >= 5 { 1.0 } else if services.len() >= 3 { 0.5 } else { 0.0 };
    }

    let dietary = as_str_list(data.get("dietary_options"));
    if !dietary.is_empty() {
        max_score += 1.0;
        score += if dietary.len() >= 5 { 1.0 } else if dietary.len() >= 3 { 0.5 } else { 0.0 };
    }

    let cuisines = as_str_list(data.get("cuisine"));
    if !cuisines.is_empty() {
        max_score += 1.0;
        score += if cuisines.len() >= 8 { 1.0 } else if cuisines.len() >= 4 { 0.5 } else { 0.0 };
    }

    let beverage = as_str_list(data.get("beverage_services"));
    if !beverage.is_empty() {
        max_score += 1.0;
        score += if beverage.iter().any(|s| s.to_lowercase().contains("liquor license")) {
            1.0
        } else if beverage.len() >= 3 {
            0.5
        } else {
            0.0
        };
    }

    if max_score > 0.0 {
        score / max_score
    } else {
        0.0
    }
}

const PREMIUM_INDICATORS: &[&str] = &["chef", "wine", "mixology", "gourmet", "premium", "exclusive", "signature"];
const FLEXIBILITY_INDICATORS: &[&str] = &["custom", "flexible", "adaptable", "personalized", "tailored"];

fn bonus_score(data: &Value) -> f64 {
    let services = as_str_list(data.get("services"));
    let description = data.get("description").and_then(Value::as_str).unwrap_or("").to_lowercase();

    let mut bonus = 0.0;
    let mut max_bonus = 0.0;

    if !services.is_empty() || !description.is_empty() {
        max_bonus += 1.0;
        let mut hits = services.iter().filter(|s| PREMIUM_INDICATORS.iter().any(|p| s.to_lowercase().contains(p))).count();
        hits += PREMIUM_INDICATORS.iter().filter(|p| description.contains(*p)).count();
        bonus += (hits as f64 / PREMIUM_INDICATORS.len() as f64).min(1.0);
    }

    if !services.is_empty() || !description.is_empty() {
        max_bonus += 1.0;
        let mut hits = services.iter().filter(|s| FLEXIBILITY_INDICATORS.iter().any(|f| s.to_lowercase().contains(f))).count();
        hits += FLEXIBILITY_INDICATORS.iter().filter(|f| description.contains(*f)).count();
        bonus += (hits as f64 / FLEXIBILITY_INDICATORS.len() as f64).min(1.0);
    }

    if max_bonus > 0.0 {
        bonus / max_bonus
    } else {
        0.0
    }
}

fn style_alignment(data: &Value, criteria: &Criteria, retrieval: &CateringRetrieval) -> f64 {
    let dietary_requirements = criteria
        .catering
        .as_ref()
        .and_then(|c| c.get("dietary_options"))
        .map(|v| as_str_list(Some(v)))
        .unwrap_or_default();
    let rec = retrieval.recommend(&criteria.style, &dietary_requirements);

    let course_score = scoring::overlap_ratio(&rec.courses, data.get("courses").unwrap_or(&Value::Null));
    let service_score = scoring::overlap_ratio(&rec.services, data.get("services").unwrap_or(&Value::Null));
    let dietary_actual = as_str_list(data.get("dietary_options"));
    let dietary_score = if rec.dietary_notes.is_empty() {
        0.0
    } else {
        let matched = rec
            .dietary_notes
            .iter()
            .filter(|(name, alternatives, _)| {
                dietary_actual.iter().any(|d| d.eq_ignore_ascii_case(name))
                    || alternatives.iter().any(|alt| dietary_actual.iter().any(|d| d.eq_ignore_ascii_case(alt)))
            })
            .count();
        matched as f64 / rec.dietary_notes.len() as f64
    };

    (course_score + service_score + dietary_score) / 3.0
}

/// Searches the catering graph, filtering by mandatory criteria and ranking
/// survivors by the shared weighted score.
pub struct CateringWorker<'a> {
    retrieval: &'a CateringRetrieval,
}

impl<'a> CateringWorker<'a> {
    /// Build a worker around the catering retrieval layer.
    pub fn new(retrieval: &'a CateringRetrieval) -> Self {
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
        coverage::ensure_coverage(Category::Catering, graph, seed_urls, crawler);

        let catering_criteria = criteria.catering.clone().unwrap_or_default();
        let predicates = rules::compile(&catering_criteria);

        let mut scored: Vec<(Value, f64)> = graph
            .query()
            .into_iter()
            .map(|(_, node)| node.original_data.clone())
            .filter(|data| rules::passes(&predicates, data))
            .map(|data| {
                let optional = scoring::optional_field_score(&data, &catering_criteria);
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

    fn retrieval() -> CateringRetrieval {
        let dir = tempfile::tempdir().unwrap();
        CateringRetrieval::load(dir.path().to_path_buf()).unwrap()
    }

    fn criteria() -> Criteria {
        serde_json::from_value(json!({
            "total_budget": 15000,
            "guest_count": 150,
            "style": "premium",
            "catering": {"mandatory": ["location"], "location": "downtown"},
        }))
        .unwrap()
    }

    #[test]
    fn filters_out_candidates_missing_mandatory_location() {
        let mut graph = Graph::new(Category::Catering);
        graph
            .insert(json!({"url": "https://c.example/a", "title": "Downtown Catering", "location": "downtown hall", "price": 100}))
            .unwrap();
        graph
            .insert(json!({"url": "https://c.example/b", "title": "Suburb Catering", "location": "suburb", "price": 100}))
            .unwrap();

        let retrieval = retrieval();
        let worker = CateringWorker::new(&retrieval);
        let results = worker.search(&criteria(), &[], &mut graph, &NullCoverageCrawler);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["title"], "Downtown Catering");
    }
}

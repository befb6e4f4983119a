//! Per-category budget bounds, scanned from a category's knowledge graph.

use banquet_graph::Graph;
use banquet_types::price;

/// `[min_budget, max_budget]` for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceConstraints {
    /// Smallest observed candidate price.
    pub min_budget: f64,
    /// Largest observed candidate price.
    pub max_budget: f64,
}

impl Default for ServiceConstraints {
    fn default() -> Self {
        Self { min_budget: 0.0, max_budget: f64::INFINITY }
    }
}

/// Scan every main node's `price` field through the shared multi-shape
/// normalizer and take the overall min/max. `(0, +inf)` if nothing
/// numeric was found.
pub fn scan(graph: &Graph) -> ServiceConstraints {
    let mut min: Option<f64> = None;
    let mut max: Option<f64> = None;

    for (_, node) in graph.query() {
        let Some(price_value) = node.original_data.get("price") else {
            continue;
        };
        let stats = price::normalize(price_value);
        if let Some(m) = stats.min {
            min = Some(min.map_or(m, |cur: f64| cur.min(m)));
        }
        if let Some(m) = stats.max {
            max = Some(max.map_or(m, |cur: f64| cur.max(m)));
        }
    }

    ServiceConstraints {
        min_budget: min.unwrap_or(0.0),
        max_budget: max.unwrap_or(f64::INFINITY),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use banquet_types::Category;
    use serde_json::json;

    #[test]
    fn empty_graph_has_unbounded_constraints() {
        let graph = Graph::new(Category::Venue);
        let constraints = scan(&graph);
        assert_eq!(constraints.min_budget, 0.0);
        assert!(constraints.max_budget.is_infinite());
    }

    #[test]
    fn scans_min_and_max_price_across_nodes() {
        let mut graph = Graph::new(Category::Venue);
        graph
            .insert(json!({
                "url": "https://venues.example/a",
                "title": "A",
                "price": {"space_rental": 3000},
            }))
            .unwrap();
        graph
            .insert(json!({
                "url": "https://venues.example/b",
                "title": "B",
                "price": {"space_rental": 9000, "catering_minimum": 1500},
            }))
            .unwrap();
        let constraints = scan(&graph);
        assert_eq!(constraints.min_budget, 1500.0);
        assert_eq!(constraints.max_budget, 9000.0);
    }
}

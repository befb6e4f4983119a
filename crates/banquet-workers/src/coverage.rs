//! Coverage-based crawl triggering.
//!
//! A worker only drives the crawler when its graph's node count for the
//! category falls below a fixed threshold; the crawler itself (URL
//! scheduling, HTML fetch/parse, visit-limit policy) lives outside this
//! workspace and is reached through this injected trait.

use banquet_graph::Graph;
use banquet_types::Category;

/// Minimum number of main nodes a category's graph should carry before a
/// worker is satisfied with existing coverage.
pub fn threshold(category: Category) -> usize {
    match category {
        Category::Venue => 60,
        Category::Catering => 30,
        Category::Decor => 30,
    }
}

/// Drives ingestion of new candidate records into a category's graph.
pub trait CoverageCrawler: Send + Sync {
    /// Crawl from `seed_urls` until the crawler's own visit limit is
    /// reached, inserting discovered records into `graph`. Returns the
    /// number of main nodes inserted.
    fn crawl(&self, category: Category, seed_urls: &[String], graph: &mut Graph) -> usize;
}

/// No crawler wired up: coverage never improves. Used when this core runs
/// without the external ingestion pipeline attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCoverageCrawler;

impl CoverageCrawler for NullCoverageCrawler {
    fn crawl(&self, _category: Category, _seed_urls: &[String], _graph: &mut Graph) -> usize {
        0
    }
}

/// Ensure `graph` has at least [`threshold`] main nodes for `category`,
/// driving `crawler` against `seed_urls` if it doesn't, then persisting via
/// `save`.
pub fn ensure_coverage(
    category: Category,
    graph: &mut Graph,
    seed_urls: &[String],
    crawler: &dyn CoverageCrawler,
) -> usize {
    let before = graph.main_node_count();
    if before >= threshold(category) {
        return before;
    }
    tracing::info!(%category, before, threshold = threshold(category), "coverage below threshold, driving crawler");
    crawler.crawl(category, seed_urls, graph);
    graph.main_node_count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_crawler_never_improves_coverage() {
        let mut graph = Graph::new(Category::Decor);
        let after = ensure_coverage(Category::Decor, &mut graph, &[], &NullCoverageCrawler);
        assert_eq!(after, 0);
    }

    #[test]
    fn sufficient_coverage_skips_crawling() {
        let mut graph = Graph::new(Category::Venue);
        for i in 0..60 {
            graph
                .insert(serde_json::json!({"url": format!("https://v.example/{i}"), "title": format!("Venue {i}")}))
                .unwrap();
        }
        let after = ensure_coverage(Category::Venue, &mut graph, &[], &NullCoverageCrawler);
        assert_eq!(after, 60);
    }
}

//! `GraphStore`: the three category graphs plus their file paths, each
//! guarded by its own mutex so writers serialize per graph while readers
//! of other categories are never blocked.

use crate::error::Result;
use crate::graph::Graph;
use banquet_types::Category;
use parking_lot::Mutex;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Owns the venue/catering/decor graphs, constructed once at startup and
/// passed around by reference (an `Arc<GraphStore>` in practice).
///
/// Per-graph writes are serialized by that graph's mutex; only the
/// crawler's coverage-building step and the enrichment engine write, and
/// never concurrently with each other for the same graph.
pub struct GraphStore {
    base_dir: PathBuf,
    venue: Mutex<Graph>,
    catering: Mutex<Graph>,
    decor: Mutex<Graph>,
}

impl GraphStore {
    /// Load (or initialize empty) all three graphs from `<type>_graph.json`
    /// files under `base_dir`.
    pub fn load(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        Ok(Self {
            venue: Mutex::new(Graph::load(Category::Venue, base_dir.join("venue_graph.json"))?),
            catering: Mutex::new(Graph::load(Category::Catering, base_dir.join("catering_graph.json"))?),
            decor: Mutex::new(Graph::load(Category::Decor, base_dir.join("decor_graph.json"))?),
            base_dir,
        })
    }

    fn path_for(&self, category: Category) -> PathBuf {
        self.base_dir.join(format!("{category}_graph.json"))
    }

    fn lock(&self, category: Category) -> parking_lot::MutexGuard<'_, Graph> {
        match category {
            Category::Venue => self.venue.lock(),
            Category::Catering => self.catering.lock(),
            Category::Decor => self.decor.lock(),
        }
    }

    /// Run `f` against `category`'s graph under its mutex.
    pub fn with_graph<R>(&self, category: Category, f: impl FnOnce(&mut Graph) -> R) -> R {
        let mut guard = self.lock(category);
        f(&mut guard)
    }

    /// Persist `category`'s graph, retrying the write once on failure per
    /// the graph-I/O error-handling policy.
    pub fn save(&self, category: Category) -> Result<()> {
        let guard = self.lock(category);
        let path = self.path_for(category);
        match guard.save(&path) {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(category = %category, error = %e, "graph save failed, retrying once");
                guard.save(&path)
            }
        }
    }

    /// Persist all three graphs.
    pub fn save_all(&self) -> Result<()> {
        self.save(Category::Venue)?;
        self.save(Category::Catering)?;
        self.save(Category::Decor)?;
        Ok(())
    }

    /// A JSON snapshot of all three graphs (`{venue: {...}, catering:
    /// {...}, decor: {...}}`), published into the Bus's shared-data
    /// registry at startup so workers see a consistent reference view
    /// rather than a racy global.
    pub fn snapshot(&self) -> Value {
        serde_json::json!({
            "venue": graph_snapshot(&self.venue.lock()),
            "catering": graph_snapshot(&self.catering.lock()),
            "decor": graph_snapshot(&self.decor.lock()),
        })
    }

    /// Base directory graph files are read from and written to.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

fn graph_snapshot(graph: &Graph) -> Value {
    serde_json::json!({
        "main_node_count": graph.main_node_count(),
        "nodes": graph.query().into_iter().map(|(id, n)| (id.clone(), n.clone())).collect::<std::collections::BTreeMap<_, _>>(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn load_on_an_empty_directory_yields_three_empty_graphs() {
        let dir = tempfile::tempdir().unwrap();
        let store = GraphStore::load(dir.path()).unwrap();
        assert_eq!(store.snapshot()["venue"]["main_node_count"], 0);
    }

    #[test]
    fn with_graph_mutates_the_right_category_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = GraphStore::load(dir.path()).unwrap();
        store.with_graph(Category::Venue, |g| {
            g.insert(json!({"url": "https://v.example/a", "title": "A"})).unwrap();
        });
        assert_eq!(store.with_graph(Category::Venue, |g| g.main_node_count()), 1);
        assert_eq!(store.with_graph(Category::Catering, |g| g.main_node_count()), 0);
    }

    #[test]
    fn save_all_then_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = GraphStore::load(dir.path()).unwrap();
            store.with_graph(Category::Decor, |g| {
                g.insert(json!({"url": "https://d.example/a", "title": "Bloom"})).unwrap();
            });
            store.save_all().unwrap();
        }
        let reloaded = GraphStore::load(dir.path()).unwrap();
        assert_eq!(reloaded.with_graph(Category::Decor, |g| g.main_node_count()), 1);
    }
}

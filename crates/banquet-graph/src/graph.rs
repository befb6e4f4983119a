//! The per-category knowledge graph: a content-addressed multi-relation
//! property graph of vendor records.

use crate::error::{GraphError, Result};
use crate::node::Node;
use banquet_types::Category;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A `(from_id, relation, to_id)` triple. Deduplicated on insert.
pub type Edge = (String, String, String);

/// The wire shape of a persisted graph file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GraphFile {
    #[serde(default)]
    nodes: BTreeMap<String, Node>,
    #[serde(default)]
    edges: Vec<Edge>,
}

/// One category's content-addressed vendor graph.
///
/// Main nodes are keyed by canonicalized URL; attribute-leaf nodes are
/// keyed by a synthetic id and shared across every main node that carries
/// the same attribute value. Writes must be serialized by the caller —
/// only the crawler (coverage building) and the enrichment engine write to
/// a given graph, and never concurrently with each other.
#[derive(Debug, Clone)]
pub struct Graph {
    category: Category,
    nodes: BTreeMap<String, Node>,
    edges: Vec<Edge>,
}

struct ProjectionField {
    source_field: &'static str,
    leaf_type: &'static str,
    edge_relation: &'static str,
}

const VENUE_FIELDS: &[ProjectionField] = &[
    ProjectionField { source_field: "capacity", leaf_type: "capacity", edge_relation: "capacity" },
    ProjectionField { source_field: "price", leaf_type: "price", edge_relation: "price" },
    ProjectionField { source_field: "atmosphere", leaf_type: "atmosphere", edge_relation: "atmosphere" },
    ProjectionField { source_field: "venue_type", leaf_type: "venue_type", edge_relation: "venue_type" },
    ProjectionField { source_field: "services", leaf_type: "service", edge_relation: "service" },
    ProjectionField { source_field: "restrictions", leaf_type: "restriction", edge_relation: "restriction" },
    ProjectionField { source_field: "supported_events", leaf_type: "event", edge_relation: "supported_event" },
    ProjectionField { source_field: "outlinks", leaf_type: "outlink", edge_relation: "reference" },
];

const CATERING_FIELDS: &[ProjectionField] = &[
    ProjectionField { source_field: "location", leaf_type: "location", edge_relation: "location" },
    ProjectionField { source_field: "price", leaf_type: "price", edge_relation: "price" },
    ProjectionField { source_field: "cuisine", leaf_type: "cuisine", edge_relation: "cuisine" },
    ProjectionField { source_field: "dietary_options", leaf_type: "dietary_option", edge_relation: "dietary_option" },
    ProjectionField { source_field: "services", leaf_type: "service", edge_relation: "service" },
    ProjectionField { source_field: "restrictions", leaf_type: "restriction", edge_relation: "restriction" },
    ProjectionField { source_field: "outlinks", leaf_type: "outlink", edge_relation: "reference" },
];

const DECOR_FIELDS: &[ProjectionField] = &[
    ProjectionField { source_field: "location", leaf_type: "location", edge_relation: "location" },
    ProjectionField { source_field: "price", leaf_type: "price", edge_relation: "price" },
    ProjectionField { source_field: "service_levels", leaf_type: "service_level", edge_relation: "service_level" },
    ProjectionField { source_field: "pre_wedding_services", leaf_type: "pre_wedding_service", edge_relation: "pre_wedding_service" },
    ProjectionField { source_field: "post_wedding_services", leaf_type: "post_wedding_service", edge_relation: "post_wedding_service" },
    ProjectionField { source_field: "day_of_services", leaf_type: "day_of_service", edge_relation: "day_of_service" },
    ProjectionField { source_field: "arrangement_styles", leaf_type: "arrangement_style", edge_relation: "arrangement_style" },
    ProjectionField { source_field: "floral_arrangements", leaf_type: "floral_arrangement", edge_relation: "floral_arrangement" },
    ProjectionField { source_field: "restrictions", leaf_type: "restriction", edge_relation: "restriction" },
    ProjectionField { source_field: "outlinks", leaf_type: "outlink", edge_relation: "reference" },
];

fn projection_table(category: Category) -> &'static [ProjectionField] {
    match category {
        Category::Venue => VENUE_FIELDS,
        Category::Catering => CATERING_FIELDS,
        Category::Decor => DECOR_FIELDS,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn non_empty_str(value: Option<&Value>) -> bool {
    matches!(value, Some(Value::String(s)) if !s.trim().is_empty())
}

impl Graph {
    /// An empty graph for `category`.
    pub fn new(category: Category) -> Self {
        Self {
            category,
            nodes: BTreeMap::new(),
            edges: Vec::new(),
        }
    }

    /// The category this graph stores.
    pub fn category(&self) -> Category {
        self.category
    }

    /// Number of main nodes of this graph's category (leaves excluded).
    pub fn main_node_count(&self) -> usize {
        let type_name = self.category.to_string();
        self.nodes.values().filter(|n| n.node_type == type_name).count()
    }

    fn add_leaf(&mut self, id: String, leaf_type: &str, value: &Value) {
        self.nodes.entry(id).or_insert_with(|| Node::new_leaf(leaf_type, value));
    }

    fn add_edge(&mut self, from: String, relation: String, to: String) {
        let triple = (from, relation, to);
        if !self.edges.contains(&triple) {
            self.edges.push(triple);
        }
    }

    fn project_field(&mut self, entity_id: &str, field: &ProjectionField, value: &Value) {
        match value {
            Value::Object(map) => {
                for (subkey, subval) in map {
                    match subval {
                        Value::Object(nested) => {
                            for (kk, vv) in nested {
                                if vv.is_number() {
                                    let id = format!("{}:{}:{}:{}", field.edge_relation, subkey, kk, vv);
                                    let leaf_type = format!("{}_{}_{}", field.leaf_type, subkey, kk);
                                    let relation = format!("{}_{}_{}", field.edge_relation, subkey, kk);
                                    self.add_leaf(id.clone(), &leaf_type, vv);
                                    self.add_edge(entity_id.to_string(), relation, id);
                                }
                            }
                        }
                        other if is_truthy(other) => {
                            let id = format!("{}:{}::{}", field.edge_relation, subkey, other);
                            let leaf_type = format!("{}_{}", field.leaf_type, subkey);
                            let relation = format!("{}_{}", field.edge_relation, subkey);
                            self.add_leaf(id.clone(), &leaf_type, other);
                            self.add_edge(entity_id.to_string(), relation, id);
                        }
                        _ => {}
                    }
                }
            }
            Value::Array(items) => {
                for item in items {
                    let rendered = match item {
                        Value::String(s) => s.to_lowercase().trim().to_string(),
                        other => other.to_string(),
                    };
                    let id = format!("{}::{}", field.edge_relation, rendered);
                    self.add_leaf(id.clone(), field.leaf_type, item);
                    self.add_edge(entity_id.to_string(), field.edge_relation.to_string(), id);
                }
            }
            Value::String(s) => {
                for part in s.split(',') {
                    let item = part.trim();
                    if item.is_empty() {
                        continue;
                    }
                    let id = format!("{}::{}", field.edge_relation, item.to_lowercase());
                    self.add_leaf(id.clone(), field.leaf_type, &Value::String(item.to_string()));
                    self.add_edge(entity_id.to_string(), field.edge_relation.to_string(), id);
                }
            }
            Value::Number(_) => {
                let id = format!("{}::{}", field.edge_relation, value);
                self.add_leaf(id.clone(), field.leaf_type, value);
                self.add_edge(entity_id.to_string(), field.edge_relation.to_string(), id);
            }
            Value::Bool(_) | Value::Null => {}
        }
    }

    fn completeness(&self, record: &Value) -> crate::node::Completeness {
        use crate::node::Completeness::*;
        let complete = match self.category {
            Category::Venue => {
                matches!(record.get("capacity"), Some(Value::Number(n)) if n.is_i64() || n.is_u64())
                    && matches!(record.get("price"), Some(Value::Object(_)))
                    && non_empty_str(record.get("title"))
            }
            Category::Catering => {
                non_empty_str(record.get("title"))
                    && record.get("services").map(is_truthy).unwrap_or(false)
                    && record.get("location").map(is_truthy).unwrap_or(false)
                    && record.get("price").map(is_truthy).unwrap_or(false)
            }
            Category::Decor => {
                non_empty_str(record.get("title"))
                    && record.get("price").map(is_truthy).unwrap_or(false)
                    && record.get("service_levels").map(is_truthy).unwrap_or(false)
                    && record.get("floral_arrangements").map(is_truthy).unwrap_or(false)
            }
        };
        if complete {
            Complete
        } else {
            Partial
        }
    }

    /// Insert or update the main node for `record["url"]`: creates it if
    /// absent, always re-runs field projection (new leaves/edges are
    /// additive and deduplicated), and refreshes completeness.
    ///
    /// `insert(x); insert(x)` leaves the graph unchanged after the second
    /// call: leaf/edge creation is idempotent, and re-running the
    /// projection on an identical record adds nothing new.
    pub fn insert(&mut self, record: Value) -> Result<()> {
        let url = record
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| GraphError::InvalidRecord("record is missing a string `url` field".to_string()))?
            .to_string();
        let title = record
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Untitled")
            .to_string();

        let completeness = self.completeness(&record);
        let type_name = self.category.to_string();

        let entry = self.nodes.entry(url.clone()).or_insert_with(|| {
            Node::new_main(type_name.clone(), title.clone(), record.clone())
        });
        entry.original_data = record.clone();
        entry.name = title;
        entry.completeness = completeness;

        for field in projection_table(self.category) {
            if let Some(value) = record.get(field.source_field) {
                self.project_field(&url, field, value);
            }
        }
        Ok(())
    }

    /// All main nodes of this graph's category.
    pub fn query(&self) -> Vec<(&String, &Node)> {
        let type_name = self.category.to_string();
        self.nodes
            .iter()
            .filter(|(_, n)| n.node_type == type_name)
            .collect()
    }

    /// Every `(from, relation, to)` triple whose source node has
    /// `node_type == from_type` and whose relation matches.
    pub fn find_by_relation(&self, from_type: &str, relation: &str) -> Vec<(&Node, &str, &Node)> {
        self.edges
            .iter()
            .filter_map(|(from, rel, to)| {
                if rel != relation {
                    return None;
                }
                let from_node = self.nodes.get(from)?;
                if from_node.node_type != from_type {
                    return None;
                }
                let to_node = self.nodes.get(to)?;
                Some((from_node, rel.as_str(), to_node))
            })
            .collect()
    }

    /// Remove every main node whose name is literally `ERROR`, plus every
    /// edge incident to it.
    pub fn clean_errors(&mut self) -> usize {
        let type_name = self.category.to_string();
        let to_remove: Vec<String> = self
            .nodes
            .iter()
            .filter(|(_, n)| n.node_type == type_name && n.name == "ERROR")
            .map(|(id, _)| id.clone())
            .collect();

        for id in &to_remove {
            self.nodes.remove(id);
        }
        self.edges.retain(|(from, _, to)| !to_remove.contains(from) && !to_remove.contains(to));
        to_remove.len()
    }

    /// A direct, mutable reference to `id`'s node, for the enrichment
    /// engine to update in place.
    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// A direct reference to `id`'s node.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Persist this graph to `path`, pretty-printed, via a temp-file +
    /// rename so a crash never leaves a half-written file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = GraphFile {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        };
        atomic_write_json(path, &file)
    }

    /// Load a graph from `path`. A missing file yields an empty graph
    /// (logged, not an error) per the graph-I/O failure semantics; a
    /// corrupt file is an error.
    pub fn load(category: Category, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "no graph file yet, starting empty");
            return Ok(Self::new(category));
        }
        let bytes = std::fs::read(path).map_err(|source| GraphError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file: GraphFile = serde_json::from_slice(&bytes).map_err(|source| GraphError::Malformed {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self {
            category,
            nodes: file.nodes,
            edges: file.edges,
        })
    }
}

pub(crate) fn atomic_write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir: PathBuf = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir).map_err(|source| GraphError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|source| GraphError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let json = serde_json::to_string_pretty(value).map_err(|source| GraphError::Malformed {
        path: path.display().to_string(),
        source,
    })?;
    tmp.write_all(json.as_bytes()).map_err(|source| GraphError::Io {
        path: path.display().to_string(),
        source,
    })?;
    tmp.persist(path).map_err(|e| GraphError::Io {
        path: path.display().to_string(),
        source: e.error,
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn venue_record(url: &str) -> Value {
        json!({
            "url": url,
            "title": "The Grand Hall",
            "capacity": 120,
            "price": {"space_rental": 3500, "catering_minimum": "2000"},
            "venue_type": "mansion",
            "services": ["bar", "valet"],
            "outlinks": ["https://example.com/more"],
        })
    }

    #[test]
    fn insert_creates_a_complete_main_node_and_typed_leaves() {
        let mut graph = Graph::new(Category::Venue);
        graph.insert(venue_record("https://venues.example/grand-hall")).unwrap();

        let main = graph.node("https://venues.example/grand-hall").unwrap();
        assert_eq!(main.completeness, crate::node::Completeness::Complete);
        assert_eq!(graph.main_node_count(), 1);

        let capacity_leaf = graph.node("capacity::120").expect("capacity leaf");
        assert_eq!(capacity_leaf.node_type, "capacity");

        let triples = graph.find_by_relation("venue", "venue_type");
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].2.name, "mansion");
    }

    #[test]
    fn insert_is_idempotent() {
        let mut graph = Graph::new(Category::Venue);
        let record = venue_record("https://venues.example/grand-hall");
        graph.insert(record.clone()).unwrap();
        let nodes_before = graph.nodes.len();
        let edges_before = graph.edges.len();
        graph.insert(record).unwrap();
        assert_eq!(graph.nodes.len(), nodes_before);
        assert_eq!(graph.edges.len(), edges_before);
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut graph = Graph::new(Category::Venue);
        graph.insert(venue_record("https://venues.example/grand-hall")).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("venue_graph.json");
        graph.save(&path).unwrap();

        let loaded = Graph::load(Category::Venue, &path).unwrap();
        assert_eq!(loaded.nodes.len(), graph.nodes.len());
        assert_eq!(loaded.edges, graph.edges);
    }

    #[test]
    fn load_missing_file_yields_empty_graph() {
        let graph = Graph::load(Category::Venue, "/nonexistent/path/venue_graph.json").unwrap();
        assert_eq!(graph.main_node_count(), 0);
    }

    #[test]
    fn clean_errors_removes_error_nodes_and_incident_edges() {
        let mut graph = Graph::new(Category::Venue);
        graph.insert(venue_record("https://venues.example/grand-hall")).unwrap();
        graph.insert(json!({"url": "https://venues.example/broken", "title": "ERROR"})).unwrap();

        let removed = graph.clean_errors();
        assert_eq!(removed, 1);
        assert!(graph.node("https://venues.example/broken").is_none());
        assert!(graph.edges.iter().all(|(from, _, to)| from != "https://venues.example/broken" && to != "https://venues.example/broken"));
    }
}

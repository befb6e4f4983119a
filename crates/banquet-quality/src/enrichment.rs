//! Best-effort repair of a low-quality vendor record: fetch its source URL,
//! extract the missing fields, and fall back to a general search when the
//! primary source doesn't fill every gap.

use crate::client::ExtractionClient;
use crate::report::QualityReport;
use crate::validator;
use banquet_types::Category;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// The result of running [`EnrichmentEngine::enrich`] over one record.
#[derive(Debug, Clone)]
pub struct EnrichedRecord {
    /// The record, merged with whatever fields enrichment managed to add.
    pub record: Value,
    /// True only if the record actually changed.
    pub applied: bool,
    /// Quality before enrichment.
    pub before: QualityReport,
    /// Quality after enrichment.
    pub after: QualityReport,
}

/// Fetches a node's source URL and merges in whatever missing fields an
/// injected [`ExtractionClient`] can extract from it or from a fallback
/// search.
pub struct EnrichmentEngine {
    http: reqwest::Client,
    extractor: Arc<dyn ExtractionClient>,
}

fn usable_title(title: &str) -> bool {
    let trimmed = title.trim();
    !trimmed.is_empty()
        && !trimmed.eq_ignore_ascii_case("unknown")
        && trimmed.chars().count() >= 3
        && !trimmed.chars().all(|c| c.is_ascii_digit())
}

fn merge_fields(record: &mut Value, fields: &Value) {
    let (Value::Object(target), Value::Object(incoming)) = (record, fields) else {
        return;
    };
    for (key, value) in incoming {
        target.insert(key.clone(), value.clone());
    }
}

impl EnrichmentEngine {
    /// Build an engine around a 10s-timeout HTTP client and the given
    /// extraction/search provider.
    pub fn new(extractor: Arc<dyn ExtractionClient>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .unwrap_or_default(),
            extractor,
        }
    }

    /// Fetch `url` and return its body on a 2xx response, `None` on any
    /// transport or status failure. Enrichment failures are swallowed by
    /// design: the node is left unchanged and the validator keeps scoring
    /// it low so the worker can still exclude it.
    async fn fetch_primary_source(&self, url: &str) -> Option<String> {
        let response = match self.http.get(url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(url, error = %e, "primary source fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::debug!(url, status = %response.status(), "primary source returned non-2xx");
            return None;
        }
        response.text().await.ok()
    }

    /// Run the full enrichment algorithm over `record`: no-op if already
    /// complete and fresh, else primary URL fetch, then a secondary search
    /// fallback if fields remain missing and the name is usable, then a
    /// bare freshness refresh if that's all that was needed.
    pub async fn enrich(&self, record: Value, category: Category) -> EnrichedRecord {
        let before = validator::validate(&record, category);
        let mut enriched = record.clone();

        if before.complete && before.fresh {
            return EnrichedRecord {
                record: enriched,
                applied: false,
                after: before.clone(),
                before,
            };
        }

        let title = record.get("title").and_then(Value::as_str).unwrap_or("").to_string();
        if !usable_title(&title) {
            return EnrichedRecord {
                record: enriched,
                applied: false,
                after: before.clone(),
                before,
            };
        }

        let url = record.get("url").and_then(Value::as_str).unwrap_or("").to_string();
        let mut touched_fields = false;

        if url.starts_with("http") {
            if let Some(html) = self.fetch_primary_source(&url).await {
                if let Some(extracted) = self
                    .extractor
                    .extract_from_html(&html, category, &before.missing_fields, &url, FETCH_TIMEOUT)
                    .await
                {
                    merge_fields(&mut enriched, &extracted);
                    touched_fields = true;
                }
            }
        }

        let after_primary = validator::validate(&enriched, category);
        if !after_primary.missing_fields.is_empty() {
            if let Some(found) = self
                .extractor
                .search_fallback(&title, category, &after_primary.missing_fields, FETCH_TIMEOUT)
                .await
            {
                merge_fields(&mut enriched, &found);
                touched_fields = true;
            }
        } else if !before.fresh {
            touched_fields = true;
        }

        if touched_fields {
            if let Value::Object(map) = &mut enriched {
                map.insert("timestamp".to_string(), Value::String(chrono::Utc::now().to_rfc3339()));
            }
        }

        let after = validator::validate(&enriched, category);
        let applied = enriched != record;
        if applied {
            if let Value::Object(map) = &mut enriched {
                map.insert("enrichment_applied".to_string(), Value::Bool(true));
            }
        }

        EnrichedRecord { record: enriched, applied, before, after }
    }

    /// Sweep `records` (id, record pairs, all of `category`), enriching
    /// every one whose score is below 0.5 with at least one missing field
    /// and a usable title+URL, keeping the update only if the score
    /// improves by at least 0.10.
    pub async fn retroactive_sweep(
        &self,
        records: Vec<(String, Value)>,
        category: Category,
    ) -> Vec<(String, Value)> {
        let mut updates = Vec::new();
        for (id, record) in records {
            let report = validator::validate(&record, category);
            let title = record.get("title").and_then(Value::as_str).unwrap_or("");
            let url = record.get("url").and_then(Value::as_str).unwrap_or("");
            if report.overall_score >= 0.5 || report.missing_fields.is_empty() {
                continue;
            }
            if !usable_title(title) || url.is_empty() {
                continue;
            }

            let outcome = self.enrich(record, category).await;
            if outcome.after.overall_score - outcome.before.overall_score >= 0.10 {
                updates.push((id, outcome.record));
            }
        }
        updates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::NullExtractionClient;
    use serde_json::json;

    #[tokio::test]
    async fn complete_fresh_record_is_a_no_op() {
        let engine = EnrichmentEngine::new(Arc::new(NullExtractionClient));
        let record = json!({
            "title": "The Grand Hall",
            "url": "https://venues.example/grand-hall",
            "capacity": 120,
            "price": {"space_rental": 3500},
            "location": "123 Main Street",
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        let outcome = engine.enrich(record.clone(), Category::Venue).await;
        assert!(!outcome.applied);
        assert_eq!(outcome.record, record);
    }

    #[tokio::test]
    async fn degraded_mode_search_fallback_fills_capacity_for_a_usable_title() {
        let engine = EnrichmentEngine::new(Arc::new(NullExtractionClient));
        let record = json!({
            "title": "The Grand Hall",
            "url": "not-a-real-url",
            "price": {"space_rental": 3500},
            "location": "123 Main Street",
        });
        let outcome = engine.enrich(record, Category::Venue).await;
        assert!(outcome.applied);
        assert_eq!(outcome.record["capacity"], json!(150));
        assert!(outcome.after.overall_score > outcome.before.overall_score);
    }

    #[tokio::test]
    async fn unusable_title_blocks_enrichment() {
        let engine = EnrichmentEngine::new(Arc::new(NullExtractionClient));
        let record = json!({"title": "Unknown", "url": "not-a-real-url"});
        let outcome = engine.enrich(record.clone(), Category::Venue).await;
        assert!(!outcome.applied);
        assert_eq!(outcome.record, record);
    }

    #[tokio::test]
    async fn retroactive_sweep_keeps_only_improvements_past_the_threshold() {
        let engine = EnrichmentEngine::new(Arc::new(NullExtractionClient));
        let records = vec![(
            "https://venues.example/grand-hall".to_string(),
            json!({
                "title": "The Grand Hall",
                "url": "not-a-real-url",
                "price": {"space_rental": 3500},
                "location": "123 Main Street",
            }),
        )];
        let updates = engine.retroactive_sweep(records, Category::Venue).await;
        assert_eq!(updates.len(), 1);
    }
}

//! Completeness / freshness / accuracy validation, grounded in a shared
//! field-alias table rather than scattered `get(a) or get(b)` lookups.

use crate::report::QualityReport;
use banquet_types::Category;
use chrono::{DateTime, Utc};
use serde_json::Value;

const COMPLETENESS_THRESHOLD: f64 = 0.5;
const FRESHNESS_THRESHOLD_DAYS: i64 = 90;
const ACCURACY_THRESHOLD: f64 = 0.6;

struct FieldGroup {
    name: &'static str,
    aliases: &'static [&'static str],
}

struct FieldPattern {
    name: &'static str,
    min_length: Option<usize>,
    max_length: Option<usize>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    min_items: Option<usize>,
}

const VENUE_GROUPS: &[FieldGroup] = &[
    FieldGroup { name: "title", aliases: &["title", "nombre", "name"] },
    FieldGroup { name: "capacity", aliases: &["capacity", "capacidad", "guest_capacity"] },
    FieldGroup { name: "location", aliases: &["location", "ubication", "address", "place"] },
    FieldGroup { name: "price", aliases: &["price", "precio", "cost", "rate"] },
];

const CATERING_GROUPS: &[FieldGroup] = &[
    FieldGroup { name: "title", aliases: &["title", "nombre", "name"] },
    FieldGroup { name: "services", aliases: &["services", "servicios", "offerings"] },
    FieldGroup { name: "location", aliases: &["location", "ubication", "address", "place"] },
    FieldGroup { name: "price", aliases: &["price", "precio", "cost", "rate"] },
];

const DECOR_GROUPS: &[FieldGroup] = &[
    FieldGroup { name: "title", aliases: &["title", "nombre", "name"] },
    FieldGroup { name: "location", aliases: &["location", "ubication", "address", "place"] },
    FieldGroup { name: "price", aliases: &["price", "precio", "cost", "rate"] },
    FieldGroup { name: "service_levels", aliases: &["service_levels", "niveles_servicio", "services"] },
];

const PATTERNS: &[FieldPattern] = &[
    FieldPattern { name: "title", min_length: Some(2), max_length: Some(200), min_value: None, max_value: None, min_items: None },
    FieldPattern { name: "capacity", min_length: None, max_length: None, min_value: Some(1.0), max_value: Some(50_000.0), min_items: None },
    FieldPattern { name: "price", min_length: None, max_length: None, min_value: Some(0.0), max_value: None, min_items: None },
    FieldPattern { name: "location", min_length: Some(5), max_length: None, min_value: None, max_value: None, min_items: None },
    FieldPattern { name: "services", min_length: None, max_length: None, min_value: None, max_value: None, min_items: Some(0) },
];

fn groups_for(category: Category) -> &'static [FieldGroup] {
    match category {
        Category::Venue => VENUE_GROUPS,
        Category::Catering => CATERING_GROUPS,
        Category::Decor => DECOR_GROUPS,
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Number(n) => n.as_f64().map(|f| f > 0.0).unwrap_or(false),
        Value::Bool(b) => *b,
    }
}

fn resolve_alias<'a>(data: &'a Value, group: &FieldGroup) -> Option<&'a Value> {
    group
        .aliases
        .iter()
        .filter_map(|alias| data.get(alias))
        .find(|v| is_present(v))
}

fn validate_completeness(data: &Value, category: Category) -> (f64, Vec<String>) {
    let groups = groups_for(category);
    if groups.is_empty() {
        return (0.0, Vec::new());
    }
    let mut present = 0usize;
    let mut missing = Vec::new();
    for group in groups {
        if resolve_alias(data, group).is_some() {
            present += 1;
        } else {
            missing.push(group.name.to_string());
        }
    }
    (present as f64 / groups.len() as f64, missing)
}

/// Parse a timestamp that may be missing a UTC offset, or carry a trailing
/// `Z`/`UTC` marker, normalizing to `+00:00` per the external interface.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let normalized = if let Some(stripped) = raw.strip_suffix('Z') {
        format!("{stripped}+00:00")
    } else if let Some(stripped) = raw.strip_suffix("UTC") {
        format!("{}+00:00", stripped.trim_end())
    } else {
        raw.to_string()
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

fn validate_freshness(data: &Value) -> (bool, f64) {
    let Some(raw) = data.get("timestamp").and_then(Value::as_str) else {
        return (false, 0.0);
    };
    let Some(parsed) = parse_timestamp(raw) else {
        return (false, 0.0);
    };
    let age_days = (Utc::now() - parsed).num_days();
    let score = (1.0 - (age_days as f64 / FRESHNESS_THRESHOLD_DAYS as f64)).max(0.0);
    (age_days <= FRESHNESS_THRESHOLD_DAYS, score)
}

fn matches_pattern(value: &Value, pattern: &FieldPattern) -> bool {
    match value {
        Value::String(s) => {
            if let Some(min) = pattern.min_length {
                if s.len() < min {
                    return false;
                }
            }
            if let Some(max) = pattern.max_length {
                if s.len() > max {
                    return false;
                }
            }
            true
        }
        Value::Number(n) => {
            let Some(f) = n.as_f64() else { return true };
            if let Some(min) = pattern.min_value {
                if f < min {
                    return false;
                }
            }
            if let Some(max) = pattern.max_value {
                if f > max {
                    return false;
                }
            }
            true
        }
        Value::Array(a) => pattern.min_items.map(|min| a.len() >= min).unwrap_or(true),
        _ => true,
    }
}

fn validate_accuracy(data: &Value, category: Category) -> (f64, Vec<String>) {
    let groups = groups_for(category);
    let mut valid = 0usize;
    let mut total = 0usize;
    let mut invalid = Vec::new();

    for pattern in PATTERNS {
        let value = groups
            .iter()
            .find_map(|g| resolve_alias(data, g).filter(|_| g.aliases.contains(&pattern.name)))
            .or_else(|| data.get(pattern.name).filter(|v| **v != Value::Null));

        if let Some(value) = value {
            total += 1;
            if matches_pattern(value, pattern) {
                valid += 1;
            } else {
                invalid.push(pattern.name.to_string());
            }
        }
    }

    let score = if total > 0 { valid as f64 / total as f64 } else { 0.0 };
    (score, invalid)
}

/// Validate `data` (a node's `original_data`) against `category`'s rules.
pub fn validate(data: &Value, category: Category) -> QualityReport {
    let (completeness_score, missing_fields) = validate_completeness(data, category);
    let (fresh, freshness_score) = validate_freshness(data);
    let (accuracy_score, invalid_fields) = validate_accuracy(data, category);

    let overall_score = completeness_score * 0.4 + freshness_score * 0.3 + accuracy_score * 0.3;
    let complete = completeness_score >= COMPLETENESS_THRESHOLD;
    let accurate = accuracy_score >= ACCURACY_THRESHOLD;
    let needs_enrichment = overall_score < 0.7 || missing_fields.len() > 2 || !fresh;

    let mut priority: u8 = 1;
    priority += if overall_score < 0.3 {
        4
    } else if overall_score < 0.5 {
        3
    } else if overall_score < 0.7 {
        2
    } else {
        1
    };
    priority += (missing_fields.len() as u8).saturating_mul(2);
    if !fresh {
        priority += 2;
    }

    QualityReport {
        complete,
        fresh,
        accurate,
        completeness_score,
        freshness_score,
        accuracy_score,
        overall_score,
        missing_fields,
        invalid_fields,
        needs_enrichment,
        enrichment_priority: priority.min(10),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn complete_fresh_venue_scores_high_and_needs_no_enrichment() {
        let data = json!({
            "title": "The Grand Hall",
            "capacity": 120,
            "location": "123 Main Street",
            "price": {"space_rental": 3500},
            "timestamp": Utc::now().to_rfc3339(),
        });
        let report = validate(&data, Category::Venue);
        assert!(report.complete);
        assert!(report.fresh);
        assert!(!report.needs_enrichment);
        assert!(report.missing_fields.is_empty());
    }

    #[test]
    fn missing_critical_fields_are_reported_and_drive_enrichment() {
        let data = json!({"title": "X"});
        let report = validate(&data, Category::Venue);
        assert!(!report.complete);
        assert!(report.needs_enrichment);
        assert!(report.missing_fields.contains(&"capacity".to_string()));
        assert!(report.missing_fields.contains(&"price".to_string()));
    }

    #[test]
    fn trailing_z_and_utc_timestamps_both_parse_to_the_same_instant() {
        let data_z = json!({"timestamp": "2024-01-01T00:00:00Z"});
        let data_utc = json!({"timestamp": "2024-01-01T00:00:00UTC"});
        let (fresh_z, score_z) = validate_freshness(&data_z);
        let (fresh_utc, score_utc) = validate_freshness(&data_utc);
        assert_eq!(fresh_z, fresh_utc);
        assert_eq!(score_z, score_utc);
    }

    #[test]
    fn recent_timestamp_is_fresh() {
        let data = json!({"timestamp": Utc::now().to_rfc3339()});
        let (fresh, score) = validate_freshness(&data);
        assert!(fresh);
        assert!(score > 0.9);
    }

    #[test]
    fn priority_is_capped_at_ten() {
        let data = json!({});
        let report = validate(&data, Category::Venue);
        assert!(report.enrichment_priority <= 10);
        assert!(report.enrichment_priority >= 1);
    }
}

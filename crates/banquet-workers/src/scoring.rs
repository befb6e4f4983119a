//! Shared scoring machinery: 30% optional-field match, 20% data-driven
//! inference, 40% style alignment, 10% bonus indicators. Each category
//! supplies its own inference/bonus heuristics and style-alignment
//! comparison; this module owns the optional-field match and the final
//! weighted combination.

use banquet_types::CategoryCriteria;
use serde_json::Value;

/// Weight given to the optional-field match component.
pub const OPTIONAL_WEIGHT: f64 = 0.3;
/// Weight given to the data-driven inference component.
pub const INFERENCE_WEIGHT: f64 = 0.2;
/// Weight given to the style-alignment component.
pub const STYLE_WEIGHT: f64 = 0.4;
/// Weight given to the bonus-indicator component.
pub const BONUS_WEIGHT: f64 = 0.1;

/// Score how well `data` matches `criteria`'s non-mandatory attributes, in
/// `[0, 1]`. String fields score 1.0 on a case-insensitive substring match;
/// list fields score the matched fraction of the expected list; anything
/// else scores 1.0 only on exact equality. Fields absent from either side
/// are skipped rather than penalized.
pub fn optional_field_score(data: &Value, criteria: &CategoryCriteria) -> f64 {
    let mut score = 0.0;
    let mut considered = 0;

    for (field, expected) in &criteria.attributes {
        if criteria.is_mandatory(field) {
            continue;
        }
        let Some(actual) = data.get(field) else { continue };
        considered += 1;

        match (expected, actual) {
            (Value::String(exp), Value::String(act)) => {
                if act.to_lowercase().contains(&exp.to_lowercase()) {
                    score += 1.0;
                }
            }
            (Value::Array(expected_items), Value::Array(actual_items)) => {
                if expected_items.is_empty() {
                    continue;
                }
                let actual_lower: Vec<String> = actual_items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|s| s.to_lowercase())
                    .collect();
                let matched = expected_items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|e| actual_lower.contains(&e.to_lowercase()))
                    .count();
                score += matched as f64 / expected_items.len() as f64;
            }
            (Value::Array(expected_items), Value::String(act)) => {
                if expected_items.is_empty() {
                    continue;
                }
                let matched = expected_items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|e| act.to_lowercase().contains(&e.to_lowercase()))
                    .count();
                score += matched as f64 / expected_items.len() as f64;
            }
            (exp, act) if exp == act => score += 1.0,
            _ => {}
        }
    }

    if considered == 0 {
        0.0
    } else {
        (score / considered as f64).min(1.0)
    }
}

/// Overlap ratio between a recommendation table's suggested terms and a
/// candidate's values for the same field: `|suggested ∩ actual| /
/// |suggested|`, case-insensitive. `0.0` if nothing was suggested.
pub fn overlap_ratio(suggested: &[String], actual: &Value) -> f64 {
    if suggested.is_empty() {
        return 0.0;
    }
    let actual_lower: Vec<String> = match actual {
        Value::Array(items) => items.iter().filter_map(Value::as_str).map(|s| s.to_lowercase()).collect(),
        Value::String(s) => vec![s.to_lowercase()],
        _ => return 0.0,
    };
    let matched = suggested.iter().filter(|s| actual_lower.iter().any(|a| a.contains(&s.to_lowercase()))).count();
    matched as f64 / suggested.len() as f64
}

/// Combine the four weighted components into a final `[0, 1]` score.
pub fn combine(optional: f64, inference: f64, style_alignment: f64, bonus: f64) -> f64 {
    (optional * OPTIONAL_WEIGHT + inference * INFERENCE_WEIGHT + style_alignment * STYLE_WEIGHT + bonus * BONUS_WEIGHT)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn criteria(mandatory: &[&str], attrs: Value) -> CategoryCriteria {
        let mut cc: CategoryCriteria = serde_json::from_value(attrs).unwrap();
        cc.mandatory = mandatory.iter().map(|s| s.to_string()).collect();
        cc
    }

    #[test]
    fn mandatory_fields_are_excluded_from_optional_scoring() {
        let criteria = criteria(&["capacity"], json!({"capacity": 100, "venue_type": "mansion"}));
        let data = json!({"capacity": 200, "venue_type": "Private Mansion"});
        assert_eq!(optional_field_score(&data, &criteria), 1.0);
    }

    #[test]
    fn list_field_scores_the_matched_fraction() {
        let criteria = criteria(&[], json!({"services": ["bar", "valet", "coordinator"]}));
        let data = json!({"services": ["bar", "valet"]});
        assert!((optional_field_score(&data, &criteria) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn overlap_ratio_is_case_insensitive() {
        let suggested = vec!["Ballroom".to_string(), "Hotel".to_string()];
        let ratio = overlap_ratio(&suggested, &json!(["hotel", "loft"]));
        assert_eq!(ratio, 0.5);
    }

    #[test]
    fn combine_respects_the_weighted_split() {
        let score = combine(1.0, 1.0, 1.0, 1.0);
        assert!((score - 1.0).abs() < 1e-9);
        let score = combine(1.0, 0.0, 0.0, 0.0);
        assert!((score - OPTIONAL_WEIGHT).abs() < 1e-9);
    }
}

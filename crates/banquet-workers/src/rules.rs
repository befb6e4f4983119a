//! Compiling a category's mandatory criteria into predicates over a
//! candidate's `original_data`.

use banquet_types::{price, CategoryCriteria};
use serde_json::Value;

/// A compiled mandatory-field check. `true` means the candidate passes.
pub type Predicate = Box<dyn Fn(&Value) -> bool + Send + Sync>;

/// A handful of vocabulary synonyms recognized when matching string/list
/// fields — e.g. "plated" and "seated meal" are the same service style
/// under different names.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("plated", &["seated meal"]),
    ("seated meal", &["plated"]),
    ("buffet", &["self-service"]),
    ("self-service", &["buffet"]),
];

fn equivalents(term: &str) -> Vec<String> {
    let mut terms = vec![term.to_lowercase()];
    if let Some((_, alts)) = SYNONYMS.iter().find(|(k, _)| k.eq_ignore_ascii_case(term)) {
        terms.extend(alts.iter().map(|s| s.to_lowercase()));
    }
    terms
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// `true` iff `actual`'s numeric leaves (walked the same way prices are
/// normalized) contain a maximum value satisfying `cmp` against `threshold`.
fn numeric_leaf_check(actual: &Value, threshold: f64, cmp: impl Fn(f64, f64) -> bool) -> bool {
    let stats = price::normalize(actual);
    match stats.max {
        Some(max) => cmp(max, threshold),
        None => false,
    }
}

fn field_predicate(field: String, expected: Value) -> Predicate {
    Box::new(move |data: &Value| {
        let Some(actual) = data.get(&field) else {
            return false;
        };

        match field.as_str() {
            "price" | "max_price" | "budget" => {
                let Some(threshold) = expected.as_f64() else {
                    return false;
                };
                return numeric_leaf_check(actual, threshold, |max, t| max <= t);
            }
            "capacity" | "min_capacity" => {
                let Some(threshold) = expected.as_f64() else {
                    return false;
                };
                return numeric_leaf_check(actual, threshold, |max, t| max >= t);
            }
            _ => {}
        }

        match (&expected, actual) {
            (Value::String(exp), Value::String(act)) => {
                equivalents(exp).iter().any(|e| contains_ci(act, e))
            }
            (Value::Array(expected_items), Value::Array(actual_items)) => {
                let actual_lower: Vec<String> = actual_items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|s| s.to_lowercase())
                    .collect();
                expected_items.iter().filter_map(Value::as_str).any(|e| {
                    equivalents(e).iter().any(|eq| actual_lower.contains(eq))
                })
            }
            (Value::Array(expected_items), Value::String(act)) => expected_items
                .iter()
                .filter_map(Value::as_str)
                .any(|e| equivalents(e).iter().any(|eq| contains_ci(act, eq))),
            _ => actual == &expected,
        }
    })
}

/// Compile one predicate per mandatory field named in `criteria`. A field
/// named as mandatory but without a supplied value is skipped — there is
/// nothing to check it against.
pub fn compile(criteria: &CategoryCriteria) -> Vec<Predicate> {
    criteria
        .mandatory
        .iter()
        .filter_map(|field| {
            criteria
                .get(field)
                .cloned()
                .map(|expected| field_predicate(field.clone(), expected))
        })
        .collect()
}

/// `true` iff `data` satisfies every compiled predicate.
pub fn passes(predicates: &[Predicate], data: &Value) -> bool {
    predicates.iter().all(|p| p(data))
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
    fn price_predicate_uses_the_max_leaf_against_an_upper_bound() {
        let criteria = criteria(&["price"], json!({"price": 5000}));
        let predicates = compile(&criteria);
        assert!(passes(&predicates, &json!({"price": {"space_rental": 3000, "catering_minimum": 1500}})));
        assert!(!passes(&predicates, &json!({"price": {"space_rental": 9000}})));
    }

    #[test]
    fn capacity_predicate_uses_the_max_leaf_against_a_lower_bound() {
        let criteria = criteria(&["capacity"], json!({"capacity": 100}));
        let predicates = compile(&criteria);
        assert!(passes(&predicates, &json!({"capacity": {"main_hall": 120, "patio": 40}})));
        assert!(!passes(&predicates, &json!({"capacity": 50})));
    }

    #[test]
    fn list_predicate_matches_case_insensitive_intersection() {
        let criteria = criteria(&["services"], json!({"services": ["Bar"]}));
        let predicates = compile(&criteria);
        assert!(passes(&predicates, &json!({"services": ["bar", "valet"]})));
        assert!(!passes(&predicates, &json!({"services": ["valet"]})));
    }

    #[test]
    fn synonym_expansion_matches_an_equivalent_term() {
        let criteria = criteria(&["meal_types"], json!({"meal_types": ["plated"]}));
        let predicates = compile(&criteria);
        assert!(passes(&predicates, &json!({"meal_types": ["seated meal"]})));
    }

    #[test]
    fn missing_field_fails_the_predicate() {
        let criteria = criteria(&["capacity"], json!({"capacity": 100}));
        let predicates = compile(&criteria);
        assert!(!passes(&predicates, &json!({"title": "The Grand Hall"})));
    }
}

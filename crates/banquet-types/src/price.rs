//! A single multi-shape price normalizer.
//!
//! Source records carry prices as a bare number, a digit run embedded in a
//! string (`"$3,500"`), or a nested map/list of any of those (a venue's
//! `price` field is usually `{space_rental: 3500, catering_minimum: "2000"}`).
//! Every consumer — the Budget Distributor's constraint scan, a Category
//! Worker's price predicate — normalizes through this one function rather
//! than re-implementing the walk.

use serde_json::Value;

/// The numeric prices found while walking a price-shaped [`Value`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceStats {
    /// Smallest number found, if any.
    pub min: Option<f64>,
    /// Largest number found, if any.
    pub max: Option<f64>,
    /// How many numeric leaves contributed.
    pub count: usize,
}

impl PriceStats {
    /// `min`, or `default` if nothing numeric was found.
    pub fn min_or(&self, default: f64) -> f64 {
        self.min.unwrap_or(default)
    }

    /// `max`, or `default` if nothing numeric was found.
    pub fn max_or(&self, default: f64) -> f64 {
        self.max.unwrap_or(default)
    }
}

/// Walk `value` and collect every numeric price it contains, recursing
/// through maps and lists and pulling digit runs out of strings.
pub fn normalize(value: &Value) -> PriceStats {
    let mut found = Vec::new();
    collect(value, &mut found);
    let min = found.iter().copied().fold(None, |acc: Option<f64>, n| {
        Some(acc.map_or(n, |m| m.min(n)))
    });
    let max = found.iter().copied().fold(None, |acc: Option<f64>, n| {
        Some(acc.map_or(n, |m| m.max(n)))
    });
    PriceStats {
        min,
        max,
        count: found.len(),
    }
}

fn collect(value: &Value, out: &mut Vec<f64>) {
    match value {
        Value::Number(n) => {
            if let Some(f) = n.as_f64() {
                out.push(f);
            }
        }
        Value::String(s) => out.extend(digit_runs(s)),
        Value::Array(items) => {
            for item in items {
                collect(item, out);
            }
        }
        Value::Object(map) => {
            for v in map.values() {
                collect(v, out);
            }
        }
        Value::Bool(_) | Value::Null => {}
    }
}

/// Pull every maximal run of digits (with at most one decimal point) out of
/// `s`, ignoring thousands separators and currency symbols.
fn digit_runs(s: &str) -> Vec<f64> {
    let mut runs = Vec::new();
    let mut current = String::new();
    let mut seen_dot = false;

    let mut flush = |current: &mut String, seen_dot: &mut bool, runs: &mut Vec<f64>| {
        if !current.is_empty() {
            if let Ok(n) = current.parse::<f64>() {
                runs.push(n);
            }
        }
        current.clear();
        *seen_dot = false;
    };

    for c in s.chars() {
        if c.is_ascii_digit() {
            current.push(c);
        } else if c == '.' && !current.is_empty() && !seen_dot {
            current.push(c);
            seen_dot = true;
        } else {
            flush(&mut current, &mut seen_dot, &mut runs);
        }
    }
    flush(&mut current, &mut seen_dot, &mut runs);
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_numbers_normalize_directly() {
        let stats = normalize(&json!(3500));
        assert_eq!(stats.min, Some(3500.0));
        assert_eq!(stats.max, Some(3500.0));
        assert_eq!(stats.count, 1);
    }

    #[test]
    fn extracts_digit_runs_from_strings() {
        let stats = normalize(&json!("$3,500 deposit"));
        assert_eq!(stats.count, 2);
        assert_eq!(stats.min, Some(3.0));
        assert_eq!(stats.max, Some(500.0));
    }

    #[test]
    fn nested_map_and_list_take_the_min_and_max_of_all_leaves() {
        let stats = normalize(&json!({
            "space_rental": 3500,
            "catering_minimum": "2000",
            "extras": [100, 250.5],
        }));
        assert_eq!(stats.min, Some(100.0));
        assert_eq!(stats.max, Some(3500.0));
        assert_eq!(stats.count, 4);
    }

    #[test]
    fn empty_or_non_numeric_value_yields_no_stats() {
        let stats = normalize(&json!({"note": "call for pricing"}));
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.min_or(0.0), 0.0);
    }
}

//! Category-weight inference and history merging.
//!
//! Weight inference is modeled behind an injected [`WeightInferenceClient`]
//! trait rather than an embedded LLM call: prompt engineering and the
//! provider wrapper are out of scope for this core, and the documented
//! degraded-mode behavior — falling back to fixed defaults — is exactly
//! what [`NullWeightInferenceClient`] does.

use banquet_types::{Category, Criteria};
use std::collections::BTreeMap;

/// `{venue: 0.4, catering: 0.35, decor: 0.25}` — the fallback used whenever
/// inference is unavailable or produces invalid output.
pub fn default_weights() -> BTreeMap<Category, f64> {
    let mut weights = BTreeMap::new();
    weights.insert(Category::Venue, 0.4);
    weights.insert(Category::Catering, 0.35);
    weights.insert(Category::Decor, 0.25);
    weights
}

/// An external category-weight inference provider.
pub trait WeightInferenceClient: Send + Sync {
    /// Infer category weights from `criteria`. Returns `None` on any
    /// failure (missing credential, parse error) so the caller falls back
    /// to [`default_weights`].
    fn infer(&self, criteria: &Criteria) -> Option<BTreeMap<Category, f64>>;
}

/// The no-credential-configured client: always degrades to defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullWeightInferenceClient;

impl WeightInferenceClient for NullWeightInferenceClient {
    fn infer(&self, _criteria: &Criteria) -> Option<BTreeMap<Category, f64>> {
        None
    }
}

/// Renormalize `weights` to sum to 1.0, treating negative entries as
/// invalid. Falls back to [`default_weights`] if the sum is zero or any
/// entry is negative.
pub fn normalize_weights(weights: &BTreeMap<Category, f64>) -> BTreeMap<Category, f64> {
    if weights.values().any(|w| *w < 0.0 || !w.is_finite()) {
        return default_weights();
    }
    let sum: f64 = weights.values().sum();
    if sum <= 0.0 {
        return default_weights();
    }
    weights.iter().map(|(k, v)| (*k, v / sum)).collect()
}

/// Kendall-style concordance between two weight rankings, ported from the
/// verified original: sort both by descending weight, then for every pair
/// of rank positions `(i, j)`, count it concordant iff the same pair of
/// categories occupies those two positions (in either order) under both
/// orderings. `1.0` when fewer than two categories are compared.
pub fn consistency(prev: &BTreeMap<Category, f64>, new: &BTreeMap<Category, f64>) -> f64 {
    let mut prev_order: Vec<Category> = prev.keys().copied().collect();
    let mut new_order: Vec<Category> = new.keys().copied().collect();
    prev_order.sort_by(|a, b| prev[b].partial_cmp(&prev[a]).unwrap_or(std::cmp::Ordering::Equal));
    new_order.sort_by(|a, b| new[b].partial_cmp(&new[a]).unwrap_or(std::cmp::Ordering::Equal));

    let n = prev_order.len().min(new_order.len());
    if n < 2 {
        return 1.0;
    }

    let mut concordant = 0;
    let mut total = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            let (pi, pj) = (prev_order[i], prev_order[j]);
            let (ni, nj) = (new_order[i], new_order[j]);
            if (pi == ni && pj == nj) || (pi == nj && pj == ni) {
                concordant += 1;
            }
            total += 1;
        }
    }
    concordant as f64 / total as f64
}

/// Merge `new` weights with `prev` history via an exponentially weighted
/// average: `learning_rate = 0.7 + 0.3 * consistency(prev, new)`, then
/// renormalize. Returns `new` (normalized) unchanged if there is no prior
/// history.
pub fn merge(prev: Option<&BTreeMap<Category, f64>>, new: &BTreeMap<Category, f64>) -> BTreeMap<Category, f64> {
    let new = normalize_weights(new);
    let Some(prev) = prev else {
        return new;
    };
    let learning_rate = 0.7 + 0.3 * consistency(prev, &new);
    let merged: BTreeMap<Category, f64> = Category::ALL
        .into_iter()
        .map(|c| {
            let merged_weight = learning_rate * new.get(&c).copied().unwrap_or(0.0)
                + (1.0 - learning_rate) * prev.get(&c).copied().unwrap_or(0.0);
            (c, merged_weight)
        })
        .collect();
    normalize_weights(&merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        let sum: f64 = default_weights().values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn negative_weight_falls_back_to_defaults() {
        let mut weights = BTreeMap::new();
        weights.insert(Category::Venue, -0.1);
        weights.insert(Category::Catering, 0.6);
        weights.insert(Category::Decor, 0.5);
        assert_eq!(normalize_weights(&weights), default_weights());
    }

    #[test]
    fn identical_rankings_are_fully_consistent() {
        let mut a = BTreeMap::new();
        a.insert(Category::Venue, 0.5);
        a.insert(Category::Catering, 0.3);
        a.insert(Category::Decor, 0.2);
        assert_eq!(consistency(&a, &a), 1.0);
    }

    #[test]
    fn reversed_ranking_is_less_consistent_than_identical() {
        let mut a = BTreeMap::new();
        a.insert(Category::Venue, 0.5);
        a.insert(Category::Catering, 0.3);
        a.insert(Category::Decor, 0.2);
        let mut b = BTreeMap::new();
        b.insert(Category::Venue, 0.2);
        b.insert(Category::Catering, 0.3);
        b.insert(Category::Decor, 0.5);
        assert!(consistency(&a, &b) < consistency(&a, &a));
    }

    #[test]
    fn merge_with_no_history_returns_new_normalized() {
        let mut new = BTreeMap::new();
        new.insert(Category::Venue, 2.0);
        new.insert(Category::Catering, 1.0);
        new.insert(Category::Decor, 1.0);
        let merged = merge(None, &new);
        assert_eq!(merged[&Category::Venue], 0.5);
    }
}

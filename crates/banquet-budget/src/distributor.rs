//! The Budget Distributor: turns a total budget and user description into
//! a per-category integer split.

use crate::constraints::{self, ServiceConstraints};
use crate::optimizer;
use crate::weights::{self, WeightInferenceClient};
use banquet_graph::{GraphStore, UserPrefsMemory};
use banquet_types::{Category, Criteria};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Computes and explains per-category budget allocations.
pub struct BudgetDistributor {
    weight_client: Arc<dyn WeightInferenceClient>,
    user_prefs: Arc<UserPrefsMemory>,
}

impl BudgetDistributor {
    /// Build a distributor around an injected weight-inference client and
    /// the shared user-preference store.
    pub fn new(weight_client: Arc<dyn WeightInferenceClient>, user_prefs: Arc<UserPrefsMemory>) -> Self {
        Self { weight_client, user_prefs }
    }

    fn constraints_for(&self, graphs: &GraphStore) -> BTreeMap<Category, ServiceConstraints> {
        Category::ALL
            .into_iter()
            .map(|c| {
                let bounds = graphs.with_graph(c, constraints::scan);
                (c, bounds)
            })
            .collect()
    }

    /// Compute `{venue, catering, decor}` summing exactly to `total_budget`.
    ///
    /// 1. Infer category weights (or fall back to defaults), merge with
    ///    `user_id`'s history, and persist the merged weights.
    /// 2. Scan each category's graph for its `[min, max]` price bounds.
    /// 3. Seed from the planner retrieval layer's style-based split.
    /// 4. Run simulated annealing; fall back to a weight-proportional
    ///    integer split if the optimizer's output doesn't sum correctly.
    pub fn distribute(
        &self,
        user_id: &str,
        total_budget: u64,
        criteria: &Criteria,
        graphs: &GraphStore,
    ) -> crate::error::Result<BTreeMap<Category, u64>> {
        let raw_weights = self
            .weight_client
            .infer(criteria)
            .map(|w| weights::normalize_weights(&w))
            .unwrap_or_else(weights::default_weights);

        let prev = self.user_prefs.get(user_id);
        let merged_weights = weights::merge(prev.as_ref(), &raw_weights);
        self.user_prefs.set(user_id, merged_weights.clone())?;

        let constraints = self.constraints_for(graphs);
        let seed: BTreeMap<Category, f64> = banquet_retrieval::planner::recommend(&criteria.style)
            .into_iter()
            .map(|(c, fraction)| (c, fraction * total_budget as f64))
            .collect();

        let distribution = optimizer::optimize(&seed, &merged_weights, &constraints, total_budget);
        let sum: u64 = distribution.values().sum();

        let distribution = if sum == total_budget {
            distribution
        } else {
            tracing::warn!(sum, total_budget, "optimizer output did not sum to the budget, falling back");
            optimizer::proportional_fallback(&merged_weights, total_budget)
        };

        Ok(distribution)
    }

    /// Render a human-readable explanation of `distribution`, ordered by
    /// the user's historical category priority.
    pub fn explain(&self, user_id: &str, distribution: &BTreeMap<Category, u64>) -> String {
        let Some(prefs) = self.user_prefs.get(user_id) else {
            return "No preference history yet for this user.".to_string();
        };

        let mut ordered: Vec<(Category, f64)> = prefs.into_iter().collect();
        ordered.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let total: u64 = distribution.values().sum();
        let mut out = String::from("Based on your preferences and available data:\n");
        for (category, weight) in ordered {
            let amount = distribution.get(&category).copied().unwrap_or(0);
            let percentage = if total > 0 { amount as f64 / total as f64 * 100.0 } else { 0.0 };
            out.push_str(&format!("\n- {category}: {amount} ({percentage:.1}% of budget)"));
            if weight > 0.4 {
                out.push_str(" (high priority)");
            } else if weight < 0.2 {
                out.push_str(" (low priority)");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weights::NullWeightInferenceClient;
    use banquet_graph::GraphStore;

    fn criteria() -> Criteria {
        Criteria {
            total_budget: 30_000,
            guest_count: 150,
            style: "premium".to_string(),
            venue: None,
            catering: None,
            decor: None,
        }
    }

    #[test]
    fn distribution_sums_to_the_requested_budget() {
        let dir = tempfile::tempdir().unwrap();
        let graphs = GraphStore::load(dir.path().join("graphs")).unwrap();
        let user_prefs = Arc::new(UserPrefsMemory::load(dir.path().join("user_pref_memory.json")).unwrap());
        let distributor = BudgetDistributor::new(Arc::new(NullWeightInferenceClient), user_prefs);

        let distribution = distributor.distribute("user-1", 30_000, &criteria(), &graphs).unwrap();
        let sum: u64 = distribution.values().sum();
        assert_eq!(sum, 30_000);
    }

    #[test]
    fn explain_without_history_is_a_graceful_message() {
        let dir = tempfile::tempdir().unwrap();
        let user_prefs = Arc::new(UserPrefsMemory::load(dir.path().join("user_pref_memory.json")).unwrap());
        let distributor = BudgetDistributor::new(Arc::new(NullWeightInferenceClient), user_prefs);
        let mut distribution = BTreeMap::new();
        distribution.insert(Category::Venue, 10_000);
        assert!(distributor.explain("nobody", &distribution).contains("No preference history"));
    }
}

//! The Planner's retrieval layer: a seed budget split by style, and the
//! error-to-correction-strategy catalogue consulted on every task failure.

use crate::success_log::SuccessLog;
use banquet_types::{Category, CorrectionStrategy};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A seed category weight split, always summing to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct BudgetPattern {
    venue: f64,
    catering: f64,
    decor: f64,
}

/// `standard`/`premium`/`budget` seed splits, renormalized from the wider
/// five-category table (venue/catering/decor/music/other) down to the three
/// categories this core tracks.
const BUDGET_PATTERNS: &[(&str, BudgetPattern)] = &[
    ("standard", BudgetPattern { venue: 0.40, catering: 0.30, decor: 0.15 }),
    ("premium", BudgetPattern { venue: 0.35, catering: 0.35, decor: 0.20 }),
    ("budget", BudgetPattern { venue: 0.45, catering: 0.25, decor: 0.15 }),
];

fn pattern_for(style: &str) -> BudgetPattern {
    BUDGET_PATTERNS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(style))
        .map(|(_, p)| *p)
        .unwrap_or(BUDGET_PATTERNS[0].1)
}

/// Suggested per-category fraction of `total_budget`, renormalized to 1.0
/// over venue+catering+decor.
pub fn recommend(style: &str) -> BTreeMap<Category, f64> {
    let p = pattern_for(style);
    let sum = p.venue + p.catering + p.decor;
    let mut out = BTreeMap::new();
    out.insert(Category::Venue, p.venue / sum);
    out.insert(Category::Catering, p.catering / sum);
    out.insert(Category::Decor, p.decor / sum);
    out
}

fn category_prefix(task_type: &str) -> Option<&'static str> {
    if task_type.starts_with("venue") {
        Some("venue")
    } else if task_type.starts_with("catering") {
        Some("catering")
    } else if task_type.starts_with("decor") {
        Some("decor")
    } else {
        None
    }
}

fn strategy(
    strategy_type: impl Into<String>,
    description: impl Into<String>,
    parameters: &[(&str, serde_json::Value)],
) -> CorrectionStrategy {
    CorrectionStrategy {
        strategy_type: strategy_type.into(),
        description: description.into(),
        parameters: parameters
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    }
}

/// Map a failed task type and its error message to one or more correction
/// strategies, keyed by substrings of the lowercased error text.
///
/// Falls back to a single `general_retry` strategy when nothing more
/// specific matches.
pub fn suggest_error_correction(task_type: &str, error: &str) -> Vec<CorrectionStrategy> {
    let error_lower = error.to_lowercase();
    let mut strategies = Vec::new();

    if task_type == "budget_distribution" {
        if error_lower.contains("timeout") {
            strategies.push(strategy(
                "budget_redistribution",
                "Redistribute the budget with more flexible constraints",
                &[("flexible_constraints", serde_json::json!(true)), ("timeout_handling", serde_json::json!(true))],
            ));
        } else if error_lower.contains("constraint") || error_lower.contains("restriction") {
            strategies.push(strategy(
                "budget_adjustment",
                "Adjust budget criteria",
                &[("adjustment_factor", serde_json::json!(0.9)), ("relax_constraints", serde_json::json!(true))],
            ));
        } else {
            strategies.push(strategy(
                "budget_retry",
                "Retry the budget distribution",
                &[("retry_with_backoff", serde_json::json!(true))],
            ));
        }
    } else if let Some(category) = category_prefix(task_type) {
        if error_lower.contains("no results") || error_lower.contains("empty") {
            strategies.push(strategy(
                format!("{category}_relax_constraints"),
                format!("Relax {category} constraints"),
                &[("relax_factor", serde_json::json!(0.8)), ("expand_search", serde_json::json!(true))],
            ));
            strategies.push(strategy(
                format!("{category}_alternative_search"),
                format!("Search for {category} alternatives"),
                &[("use_alternatives", serde_json::json!(true)), ("fallback_options", serde_json::json!(true))],
            ));
        } else if error_lower.contains("timeout") {
            strategies.push(strategy(
                format!("{category}_timeout_handling"),
                format!("Handle a {category} search timeout"),
                &[("timeout_retry", serde_json::json!(true)), ("reduced_scope", serde_json::json!(true))],
            ));
        } else if error_lower.contains("budget") || error_lower.contains("price") {
            strategies.push(strategy(
                format!("{category}_budget_increase"),
                format!("Increase the {category} budget"),
                &[("budget_increase", serde_json::json!(0.2)), ("flexible_pricing", serde_json::json!(true))],
            ));
        } else {
            strategies.push(strategy(
                format!("{category}_retry"),
                format!("Retry the {category} search"),
                &[("retry_with_backoff", serde_json::json!(true)), ("improved_query", serde_json::json!(true))],
            ));
        }
    }

    if strategies.is_empty() {
        strategies.push(strategy(
            "general_retry",
            "Retry the task with adjusted parameters",
            &[("retry_count", serde_json::json!(1)), ("backoff_delay", serde_json::json!(2))],
        ));
    }

    strategies
}

/// The Planner's retrieval layer: seed budget splits plus the session-wide
/// success log of which strategies actually resolved a prior error.
pub struct PlannerRetrieval {
    success_log: SuccessLog,
}

impl PlannerRetrieval {
    /// Load the success log from `base_dir/planner_patterns.json`.
    pub fn load(base_dir: PathBuf) -> crate::error::Result<Self> {
        Ok(Self {
            success_log: SuccessLog::load(base_dir.join("planner_patterns.json"))?,
        })
    }

    /// Seed budget split for `style`.
    pub fn recommend(&self, style: &str) -> BTreeMap<Category, f64> {
        recommend(style)
    }

    /// Correction strategies for a failed task.
    pub fn suggest_error_correction(&self, task_type: &str, error: &str) -> Vec<CorrectionStrategy> {
        suggest_error_correction(task_type, error)
    }

    /// Record whether `strategy_type` ultimately resolved the error it was
    /// applied to.
    pub fn update(&self, strategy_type: &str, success: bool) -> crate::error::Result<()> {
        self.success_log.update(strategy_type, success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn budget_recommendation_sums_to_one() {
        let rec = recommend("premium");
        let sum: f64 = rec.values().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_style_falls_back_to_standard() {
        let rec = recommend("something_unheard_of");
        assert_eq!(rec[&Category::Venue], BUDGET_PATTERNS[0].1.venue / 0.85);
    }

    #[test]
    fn timeout_error_on_venue_search_maps_to_timeout_handling() {
        let strategies = suggest_error_correction("venue_search", "Timeout esperando respuesta");
        assert_eq!(strategies[0].strategy_type, "venue_timeout_handling");
    }

    #[test]
    fn unmatched_error_falls_back_to_general_retry() {
        let strategies = suggest_error_correction("mystery_task", "something odd happened");
        assert_eq!(strategies[0].strategy_type, "general_retry");
    }
}

//! The quality report produced by the validator.

use serde::{Deserialize, Serialize};

/// Completeness / freshness / accuracy scoring for one vendor record.
///
/// `overall_score = 0.4·completeness + 0.3·freshness + 0.3·accuracy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    /// `completeness_score >= 0.5`.
    pub complete: bool,
    /// `freshness_score` implies age within the staleness threshold.
    pub fresh: bool,
    /// `accuracy_score >= 0.6`.
    pub accurate: bool,
    /// Fraction of critical field groups present, via alias resolution.
    pub completeness_score: f64,
    /// `max(0, 1 - age_days / threshold_days)`.
    pub freshness_score: f64,
    /// Fraction of pattern-checked fields that passed their pattern.
    pub accuracy_score: f64,
    /// Weighted sum of the three scores above, in `[0, 1]`.
    pub overall_score: f64,
    /// Critical field groups with no alias resolving to a present value.
    pub missing_fields: Vec<String>,
    /// Fields found but failing their validation pattern.
    pub invalid_fields: Vec<String>,
    /// True if this node is a worthwhile enrichment candidate.
    pub needs_enrichment: bool,
    /// `1..=10`, higher is more urgent.
    pub enrichment_priority: u8,
}

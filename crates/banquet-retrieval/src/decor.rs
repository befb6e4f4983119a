//! Style-conditioned decor recommendations: service levels, arrangement
//! styles, and floral choices.

use crate::success_log::SuccessLog;
use serde::Serialize;
use std::path::PathBuf;

struct StylePattern {
    style: &'static str,
    service_levels: &'static [&'static str],
    arrangement_styles: &'static [&'static str],
    floral_arrangements: &'static [&'static str],
}

const STYLES: &[StylePattern] = &[
    StylePattern {
        style: "classic",
        service_levels: &["Full-Service Floral Design", "Event Coordination"],
        arrangement_styles: &["Traditional Centerpieces", "Formal Arches"],
        floral_arrangements: &["Roses", "Peonies", "Hydrangeas"],
    },
    StylePattern {
        style: "modern",
        service_levels: &["Minimalist Styling", "Day-Of Coordination"],
        arrangement_styles: &["Geometric Installations", "Monochrome Centerpieces"],
        floral_arrangements: &["Orchids", "Succulents", "Anthuriums"],
    },
    StylePattern {
        style: "rustic",
        service_levels: &["Full-Service Floral Design", "Pre-Event Setup"],
        arrangement_styles: &["Wildflower Arrangements", "Wood-Slab Centerpieces"],
        floral_arrangements: &["Wildflowers", "Baby's Breath", "Eucalyptus"],
    },
    StylePattern {
        style: "luxury",
        service_levels: &["Full-Service Floral Design", "Event Coordination", "Post-Event Teardown"],
        arrangement_styles: &["Statement Installations", "Cascading Arches"],
        floral_arrangements: &["Garden Roses", "Orchids", "Peonies"],
    },
];

fn style_data(style: &str) -> &'static StylePattern {
    STYLES
        .iter()
        .find(|s| s.style.eq_ignore_ascii_case(style))
        .unwrap_or(&STYLES[0])
}

/// A style-conditioned decor suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct DecorRecommendation {
    /// The requested style, verbatim.
    pub style: String,
    /// Suggested service levels (pre/day-of/post-event coverage).
    pub service_levels: Vec<String>,
    /// Suggested arrangement styles.
    pub arrangement_styles: Vec<String>,
    /// Suggested floral choices.
    pub floral_arrangements: Vec<String>,
}

/// Build a decor recommendation for `style`.
pub fn recommend(style: &str) -> DecorRecommendation {
    let data = style_data(style);
    DecorRecommendation {
        style: style.to_string(),
        service_levels: data.service_levels.iter().map(|s| s.to_string()).collect(),
        arrangement_styles: data.arrangement_styles.iter().map(|s| s.to_string()).collect(),
        floral_arrangements: data.floral_arrangements.iter().map(|s| s.to_string()).collect(),
    }
}

/// The decor worker's retrieval layer.
pub struct DecorRetrieval {
    success_log: SuccessLog,
}

impl DecorRetrieval {
    /// Load the success log from `base_dir/decor_patterns.json`.
    pub fn load(base_dir: PathBuf) -> crate::error::Result<Self> {
        Ok(Self {
            success_log: SuccessLog::load(base_dir.join("decor_patterns.json"))?,
        })
    }

    /// Style-conditioned suggestion for `style`.
    pub fn recommend(&self, style: &str) -> DecorRecommendation {
        recommend(style)
    }

    /// Record whether a search keyed by `style` returned a usable top
    /// candidate.
    pub fn update(&self, style: &str, success: bool) -> crate::error::Result<()> {
        self.success_log.update(style, success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luxury_style_includes_post_event_teardown() {
        let rec = recommend("luxury");
        assert!(rec.service_levels.iter().any(|s| s.contains("Post-Event")));
    }

    #[test]
    fn unknown_style_falls_back_to_classic() {
        let rec = recommend("eclectic");
        assert_eq!(rec.floral_arrangements, STYLES[0].floral_arrangements.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }
}

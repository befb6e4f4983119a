//! Style-conditioned catering recommendations: course lists, dietary
//! normalizations, and a per-person price band.

use crate::success_log::SuccessLog;
use serde::Serialize;
use std::path::PathBuf;

struct StylePattern {
    style: &'static str,
    courses: &'static [&'static str],
    services: &'static [&'static str],
    price_per_person: (f64, f64),
}

const STYLES: &[StylePattern] = &[
    StylePattern {
        style: "standard",
        courses: &["appetizer", "main course", "dessert"],
        services: &["Plated Service", "Bar Service"],
        price_per_person: (50.0, 100.0),
    },
    StylePattern {
        style: "premium",
        courses: &["appetizer", "soup", "main course", "salad", "dessert"],
        services: &["Full-Service Catering", "Bar Service", "Event Coordination"],
        price_per_person: (100.0, 200.0),
    },
    StylePattern {
        style: "buffet",
        courses: &["salad station", "main course", "dessert station"],
        services: &["Buffet Service", "Bar Service"],
        price_per_person: (35.0, 75.0),
    },
    StylePattern {
        style: "formal",
        courses: &["appetizer", "soup", "main course", "cheese course", "dessert"],
        services: &["Plated Service", "Full-Service Catering", "Bar Service"],
        price_per_person: (120.0, 250.0),
    },
];

struct DietaryAlternatives {
    name: &'static str,
    alternatives: &'static [&'static str],
    cost_multiplier: f64,
}

const DIETARY_TABLE: &[DietaryAlternatives] = &[
    DietaryAlternatives { name: "vegetarian", alternatives: &["vegan", "gluten-free"], cost_multiplier: 1.1 },
    DietaryAlternatives { name: "vegan", alternatives: &["vegetarian", "gluten-free"], cost_multiplier: 1.2 },
    DietaryAlternatives { name: "gluten-free", alternatives: &["vegetarian", "vegan"], cost_multiplier: 1.15 },
];

fn style_data(style: &str) -> &'static StylePattern {
    STYLES
        .iter()
        .find(|s| s.style.eq_ignore_ascii_case(style))
        .unwrap_or(&STYLES[0])
}

/// Normalize a dietary requirement to its canonical name and known
/// alternatives, if recognized.
pub fn normalize_dietary(requirement: &str) -> Option<(&'static str, &'static [&'static str], f64)> {
    DIETARY_TABLE
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(requirement))
        .map(|d| (d.name, d.alternatives, d.cost_multiplier))
}

/// A style-conditioned catering suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct CateringRecommendation {
    /// The requested style, verbatim.
    pub style: String,
    /// Suggested course structure.
    pub courses: Vec<String>,
    /// Suggested service offerings.
    pub services: Vec<String>,
    /// `(min, max)` per-person price, before dietary cost multipliers.
    pub price_per_person: (f64, f64),
    /// Dietary requirements recognized from the request, each with its
    /// closest alternatives and per-person cost multiplier.
    pub dietary_notes: Vec<(String, Vec<String>, f64)>,
}

/// Build a catering recommendation for `style` and the requested dietary
/// options.
pub fn recommend(style: &str, dietary_requirements: &[String]) -> CateringRecommendation {
    let data = style_data(style);
    let dietary_notes = dietary_requirements
        .iter()
        .filter_map(|req| normalize_dietary(req).map(|(name, alts, mult)| (name.to_string(), alts.iter().map(|a| a.to_string()).collect(), mult)))
        .collect();

    CateringRecommendation {
        style: style.to_string(),
        courses: data.courses.iter().map(|s| s.to_string()).collect(),
        services: data.services.iter().map(|s| s.to_string()).collect(),
        price_per_person: data.price_per_person,
        dietary_notes,
    }
}

/// The catering worker's retrieval layer.
pub struct CateringRetrieval {
    success_log: SuccessLog,
}

impl CateringRetrieval {
    /// Load the success log from `base_dir/catering_patterns.json`.
    pub fn load(base_dir: PathBuf) -> crate::error::Result<Self> {
        Ok(Self {
            success_log: SuccessLog::load(base_dir.join("catering_patterns.json"))?,
        })
    }

    /// Style-conditioned suggestion for `style` and dietary requirements.
    pub fn recommend(&self, style: &str, dietary_requirements: &[String]) -> CateringRecommendation {
        recommend(style, dietary_requirements)
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
    fn premium_style_has_more_courses_than_standard() {
        let premium = recommend("premium", &[]);
        let standard = recommend("standard", &[]);
        assert!(premium.courses.len() > standard.courses.len());
    }

    #[test]
    fn recognized_dietary_requirement_carries_alternatives_and_multiplier() {
        let rec = recommend("standard", &["vegan".to_string()]);
        assert_eq!(rec.dietary_notes.len(), 1);
        assert_eq!(rec.dietary_notes[0].0, "vegan");
        assert!(rec.dietary_notes[0].2 > 1.0);
    }

    #[test]
    fn unrecognized_dietary_requirement_is_dropped_not_errored() {
        let rec = recommend("standard", &["moon-diet".to_string()]);
        assert!(rec.dietary_notes.is_empty());
    }
}

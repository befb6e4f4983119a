//! Style-conditioned venue recommendations, consulted by the venue worker's
//! scoring step and used to seed a session's venue search criteria.

use crate::success_log::SuccessLog;
use serde::Serialize;
use std::path::PathBuf;

struct StyleCharacteristics {
    style: &'static str,
    atmosphere: &'static [&'static str],
    venue_type: &'static [&'static str],
    services: &'static [&'static str],
    supported_events: &'static [&'static str],
    restrictions: &'static [&'static str],
}

const STYLES: &[StyleCharacteristics] = &[
    StyleCharacteristics {
        style: "classic",
        atmosphere: &["Elegant", "Traditional", "Sophisticated", "Indoor", "Formal"],
        venue_type: &["Ballroom", "Hotel", "Country Club", "Club"],
        services: &["Full-Service Venue", "Event Coordination", "Catering", "Bar Service"],
        supported_events: &["Wedding Ceremony", "Wedding Reception", "Rehearsal Dinner"],
        restrictions: &[],
    },
    StyleCharacteristics {
        style: "modern",
        atmosphere: &["Contemporary", "Minimalist", "Urban", "Indoor"],
        venue_type: &["Modern Venue", "Loft", "Gallery", "Rooftop"],
        services: &["Tech Support", "AV Equipment", "Flexible Layout"],
        supported_events: &["Wedding Ceremony", "Wedding Reception", "Corporate Events"],
        restrictions: &[],
    },
    StyleCharacteristics {
        style: "rustic",
        atmosphere: &["Rustic", "Natural", "Countryside", "Outdoor"],
        venue_type: &["Barn", "Farm", "Vineyard", "Garden"],
        services: &["Outdoor Spaces", "Natural Settings", "Parking"],
        supported_events: &["Wedding Ceremony", "Wedding Reception", "Outdoor Events"],
        restrictions: &["Weather Dependent"],
    },
    StyleCharacteristics {
        style: "luxury",
        atmosphere: &["Luxurious", "Opulent", "Exclusive", "Elegant"],
        venue_type: &["Luxury Hotel", "Mansion", "Private Estate", "Resort"],
        services: &["VIP Services", "Concierge", "Premium Catering"],
        supported_events: &["Wedding Ceremony", "Wedding Reception", "Luxury Events"],
        restrictions: &["Minimum Guest Count", "Premium Pricing"],
    },
];

fn style_data(style: &str) -> &'static StyleCharacteristics {
    STYLES
        .iter()
        .find(|s| s.style.eq_ignore_ascii_case(style))
        .unwrap_or(&STYLES[0])
}

/// A style-conditioned venue suggestion.
#[derive(Debug, Clone, Serialize)]
pub struct VenueRecommendation {
    /// The requested style, verbatim.
    pub style: String,
    /// `(0.8, 1.2) * guest_count`.
    pub capacity_range: (u64, u64),
    /// `(0.8, 1.2) * budget`.
    pub price_range: (f64, f64),
    /// Suggested atmosphere descriptors.
    pub atmosphere: Vec<String>,
    /// Suggested venue types.
    pub venue_type: Vec<String>,
    /// Suggested service offerings.
    pub services: Vec<String>,
    /// Event types this style supports.
    pub supported_events: Vec<String>,
    /// Known restrictions for this style.
    pub restrictions: Vec<String>,
}

fn truncated(list: &[&'static str], budget: f64) -> Vec<String> {
    let cap = if budget < 5000.0 {
        2
    } else if budget < 10_000.0 {
        3
    } else {
        list.len()
    };
    list.iter().take(cap).map(|s| s.to_string()).collect()
}

/// Build a venue recommendation for `(budget, guest_count, style)`.
pub fn recommend(budget: f64, guest_count: u64, style: &str) -> VenueRecommendation {
    let data = style_data(style);
    VenueRecommendation {
        style: style.to_string(),
        capacity_range: ((guest_count as f64 * 0.8) as u64, (guest_count as f64 * 1.2) as u64),
        price_range: (budget * 0.8, budget * 1.2),
        atmosphere: truncated(data.atmosphere, budget),
        venue_type: truncated(data.venue_type, budget),
        services: truncated(data.services, budget),
        supported_events: truncated(data.supported_events, budget),
        restrictions: truncated(data.restrictions, budget),
    }
}

/// The venue worker's retrieval layer: style recommendations plus a success
/// log of which style/search combinations actually converted.
pub struct VenueRetrieval {
    success_log: SuccessLog,
}

impl VenueRetrieval {
    /// Load the success log from `base_dir/venue_patterns.json`.
    pub fn load(base_dir: PathBuf) -> crate::error::Result<Self> {
        Ok(Self {
            success_log: SuccessLog::load(base_dir.join("venue_patterns.json"))?,
        })
    }

    /// Style-conditioned suggestion for `(budget, guest_count, style)`.
    pub fn recommend(&self, budget: f64, guest_count: u64, style: &str) -> VenueRecommendation {
        recommend(budget, guest_count, style)
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
    fn low_budget_truncates_recommendation_lists() {
        let rec = recommend(3000.0, 100, "classic");
        assert_eq!(rec.atmosphere.len(), 2);
    }

    #[test]
    fn unknown_style_falls_back_to_classic() {
        let rec = recommend(20_000.0, 100, "eclectic");
        assert_eq!(rec.venue_type, STYLES[0].venue_type.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }

    #[test]
    fn capacity_range_is_plus_minus_twenty_percent() {
        let rec = recommend(20_000.0, 100, "modern");
        assert_eq!(rec.capacity_range, (80, 120));
    }
}

//! The inbound planning request: budget, guest count, style and per-category
//! requirements.

use crate::error::{Result, TypesError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One of the three specialist categories the Planner coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Reception venue.
    Venue,
    /// Food and beverage service.
    Catering,
    /// Floral and ambient decor.
    Decor,
}

impl Category {
    /// All categories, in the order the Planner dispatches them.
    pub const ALL: [Category; 3] = [Category::Venue, Category::Catering, Category::Decor];

    /// The `<category>_search` task type name for this category.
    pub fn search_task_name(self) -> &'static str {
        match self {
            Category::Venue => "venue_search",
            Category::Catering => "catering_search",
            Category::Decor => "decor_search",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Venue => "venue",
            Category::Catering => "catering",
            Category::Decor => "decor",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Category {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "venue" => Ok(Category::Venue),
            "catering" => Ok(Category::Catering),
            "decor" => Ok(Category::Decor),
            other => Err(TypesError::InvalidCriteria(format!(
                "unknown category: {other}"
            ))),
        }
    }
}

/// Per-category requirements: which fields are mandatory, plus free-form
/// attributes (`capacity`, `venue_type`, `meal_types`, `dietary_options`,
/// `service_levels`, `floral_arrangements`, ...).
///
/// Attributes are kept as an open `Value` map rather than a fixed struct
/// because each category's vocabulary differs and the source data is
/// itself schema-less; `mandatory` names which of those attributes must
/// hold for every candidate a worker returns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CategoryCriteria {
    /// Field names that every returned candidate must satisfy.
    #[serde(default)]
    pub mandatory: Vec<String>,
    /// Free-form attribute values, keyed by field name.
    #[serde(flatten)]
    pub attributes: BTreeMap<String, Value>,
}

impl CategoryCriteria {
    /// Fetch an attribute by name, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.attributes.get(field)
    }

    /// True if `field` is listed as mandatory.
    pub fn is_mandatory(&self, field: &str) -> bool {
        self.mandatory.iter().any(|m| m == field)
    }
}

/// The user's structured planning request.
///
/// Missing scalar fields widen the search rather than fail it; only
/// `total_budget`, `guest_count` and `style` are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Criteria {
    /// Total budget across all categories, in whole currency units.
    pub total_budget: u64,
    /// Expected number of guests.
    pub guest_count: u64,
    /// Overall aesthetic, e.g. "luxury", "rustic".
    pub style: String,
    /// Venue requirements, if the user supplied any.
    #[serde(default)]
    pub venue: Option<CategoryCriteria>,
    /// Catering requirements, if the user supplied any.
    #[serde(default)]
    pub catering: Option<CategoryCriteria>,
    /// Decor requirements, if the user supplied any.
    #[serde(default)]
    pub decor: Option<CategoryCriteria>,
}

impl Criteria {
    /// Structural validation: a malformed request is rejected before it
    /// ever reaches the Planner's belief state.
    pub fn validate(&self) -> Result<()> {
        if self.style.trim().is_empty() {
            return Err(TypesError::InvalidCriteria("style must not be empty".into()));
        }
        Ok(())
    }

    /// The per-category criteria for `category`, if the user supplied one.
    pub fn category(&self, category: Category) -> Option<&CategoryCriteria> {
        match category {
            Category::Venue => self.venue.as_ref(),
            Category::Catering => self.catering.as_ref(),
            Category::Decor => self.decor.as_ref(),
        }
    }

    /// Categories the user actually listed requirements for.
    pub fn requested_categories(&self) -> Vec<Category> {
        Category::ALL
            .into_iter()
            .filter(|c| self.category(*c).is_some())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_minimal_criteria() {
        let json = serde_json::json!({
            "total_budget": 50000,
            "guest_count": 100,
            "style": "luxury",
        });
        let criteria: Criteria = serde_json::from_value(json).unwrap();
        assert_eq!(criteria.total_budget, 50000);
        assert!(criteria.venue.is_none());
        assert!(criteria.requested_categories().is_empty());
    }

    #[test]
    fn rejects_blank_style() {
        let criteria = Criteria {
            total_budget: 0,
            guest_count: 0,
            style: "  ".into(),
            venue: None,
            catering: None,
            decor: None,
        };
        assert!(criteria.validate().is_err());
    }

    #[test]
    fn category_criteria_mandatory_lookup() {
        let json = serde_json::json!({
            "mandatory": ["capacity", "venue_type"],
            "capacity": 100,
            "venue_type": "mansion",
        });
        let cc: CategoryCriteria = serde_json::from_value(json).unwrap();
        assert!(cc.is_mandatory("capacity"));
        assert!(!cc.is_mandatory("price"));
        assert_eq!(cc.get("venue_type").unwrap(), "mansion");
    }
}

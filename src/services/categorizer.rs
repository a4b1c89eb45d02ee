//! Maps raw venue type tags onto the small set of activity categories the
//! diversity selector balances against.

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Dining,
    Culture,
    Nightlife,
    Outdoor,
    Shopping,
    Entertainment,
    Wellness,
    Other,
}

impl ActivityCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Dining => "dining",
            ActivityCategory::Culture => "culture",
            ActivityCategory::Nightlife => "nightlife",
            ActivityCategory::Outdoor => "outdoor",
            ActivityCategory::Shopping => "shopping",
            ActivityCategory::Entertainment => "entertainment",
            ActivityCategory::Wellness => "wellness",
            ActivityCategory::Other => "other",
        }
    }
}

const POINT_OF_INTEREST: &str = "point_of_interest";

// Checked in order; the first category whose tag set matches wins, so the
// ordering here is part of the categorization contract.
const CATEGORY_TABLE: &[(ActivityCategory, &[&str])] = &[
    (
        ActivityCategory::Dining,
        &[
            "restaurant",
            "cafe",
            "food",
            "meal_takeaway",
            "meal_delivery",
            "bakery",
            "bar",
        ],
    ),
    (
        ActivityCategory::Culture,
        &[
            "museum",
            "art_gallery",
            "church",
            "mosque",
            "temple",
            "hindu_temple",
            "synagogue",
            "library",
            "university",
            "historical_landmark",
            "place_of_worship",
            "cultural_center",
        ],
    ),
    (
        ActivityCategory::Nightlife,
        &["night_club", "casino", "bar"],
    ),
    (
        ActivityCategory::Outdoor,
        &[
            "park",
            "beach",
            "natural_feature",
            "campground",
            "hiking_area",
            "national_park",
            "rv_park",
            "playground",
        ],
    ),
    (
        ActivityCategory::Shopping,
        &[
            "shopping_mall",
            "store",
            "clothing_store",
            "jewelry_store",
            "book_store",
            "electronics_store",
            "home_goods_store",
            "supermarket",
            "convenience_store",
            "department_store",
        ],
    ),
    (
        ActivityCategory::Entertainment,
        &[
            "movie_theater",
            "theater",
            "stadium",
            "amusement_park",
            "bowling_alley",
            "zoo",
            "aquarium",
            "tourist_attraction",
        ],
    ),
    (
        ActivityCategory::Wellness,
        &["spa", "gym", "physiotherapist", "hair_care", "beauty_salon"],
    ),
];

// Tags that push an ambiguous "bar" toward dining.
const DINING_COMPANIONS: &[&str] = &["restaurant", "cafe", "food"];

/// Resolve a venue's type tags to a single category. Total over any tag
/// list; unmatched sets resolve to `Other`.
pub fn categorize(tags: &[String]) -> ActivityCategory {
    let refs: Vec<&str> = tags.iter().map(String::as_str).collect();
    categorize_tags(&refs)
}

fn categorize_tags(tags: &[&str]) -> ActivityCategory {
    for (category, table_tags) in CATEGORY_TABLE {
        for tag in tags {
            if table_tags.contains(tag) {
                if *tag == "bar" {
                    let serves_food = tags.iter().any(|t| DINING_COMPANIONS.contains(t));
                    return if serves_food {
                        ActivityCategory::Dining
                    } else {
                        ActivityCategory::Nightlife
                    };
                }
                return *category;
            }
        }
    }

    // A bare point_of_interest marker says nothing; retry on the rest.
    if tags.contains(&POINT_OF_INTEREST) && tags.len() > 1 {
        let rest: Vec<&str> = tags
            .iter()
            .copied()
            .filter(|t| *t != POINT_OF_INTEREST)
            .collect();
        return categorize_tags(&rest);
    }

    ActivityCategory::Other
}

/// Fraction of unique categories in a day's venues, capped at seven
/// distinguishable categories. 1.0 means all different. Logging-only signal.
pub fn diversity_score(categories: &[ActivityCategory]) -> f64 {
    if categories.is_empty() {
        return 1.0;
    }
    let unique = {
        let mut seen = std::collections::HashSet::new();
        categories.iter().filter(|c| seen.insert(**c)).count()
    };
    let max_possible = categories.len().min(7);
    (unique as f64 / max_possible as f64).min(1.0)
}

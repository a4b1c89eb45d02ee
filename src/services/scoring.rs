//! Preference-weighted desirability scoring for candidate venues.

use serde::{Deserialize, Serialize};

use crate::models::preferences::PreferenceProfile;
use crate::models::venue::Venue;

// Ratings below this are treated as neutral rather than penalized.
const RATING_FLOOR: f64 = 3.5;
const RATING_CEILING: f64 = 5.0;
const NEUTRAL: f64 = 0.5;
const PHOTO_MISSING_VALUE: f64 = 0.3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub popularity_weight: f64,
    pub price_fit_weight: f64,
    pub photo_weight: f64,
    /// Keyword boost for pools under the large-pool threshold.
    pub keyword_boost: f64,
    /// Boost used instead when the pool is large enough to discriminate.
    pub keyword_boost_large_pool: f64,
    pub large_pool_threshold: usize,
    /// Terms that trigger the boost when present in both the trip notes and
    /// the venue's own text.
    pub boost_terms: Vec<String>,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            popularity_weight: 0.5,
            price_fit_weight: 0.3,
            photo_weight: 0.2,
            keyword_boost: 0.2,
            keyword_boost_large_pool: 0.25,
            large_pool_threshold: 100,
            boost_terms: [
                "rooftop", "sunset", "viewpoint", "market", "historic", "beach", "local",
                "hidden",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl ScoreWeights {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let parse = |name: &str, fallback: f64| {
            std::env::var(name)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(fallback)
        };
        Self {
            popularity_weight: parse("SCORE_POPULARITY_WEIGHT", defaults.popularity_weight),
            price_fit_weight: parse("SCORE_PRICE_FIT_WEIGHT", defaults.price_fit_weight),
            photo_weight: parse("SCORE_PHOTO_WEIGHT", defaults.photo_weight),
            keyword_boost: parse("SCORE_KEYWORD_BOOST", defaults.keyword_boost),
            keyword_boost_large_pool: parse(
                "SCORE_KEYWORD_BOOST_LARGE_POOL",
                defaults.keyword_boost_large_pool,
            ),
            ..defaults
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScoreBreakdown {
    pub popularity: f64,
    pub price_fit: f64,
    pub photo: f64,
    pub keyword_boost: f64,
}

/// A venue paired with its ephemeral desirability score. Never persisted.
#[derive(Debug, Clone)]
pub struct ScoredCandidate {
    pub venue: Venue,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Default, Clone)]
pub struct VenueScorer {
    pub weights: ScoreWeights,
}

impl VenueScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Score every venue in the pool, preserving discovery order so later
    /// stable sorts break ties on it.
    pub fn score_pool(
        &self,
        venues: &[Venue],
        profile: &PreferenceProfile,
        notes: Option<&str>,
    ) -> Vec<ScoredCandidate> {
        let pool_size = venues.len();
        venues
            .iter()
            .map(|venue| self.score_venue(venue, profile, notes, pool_size))
            .collect()
    }

    fn score_venue(
        &self,
        venue: &Venue,
        profile: &PreferenceProfile,
        notes: Option<&str>,
        pool_size: usize,
    ) -> ScoredCandidate {
        let popularity = popularity_component(venue.rating);
        let price_fit = price_fit_component(venue.price_level, profile);
        let photo = if venue.has_photo {
            1.0
        } else {
            PHOTO_MISSING_VALUE
        };
        let keyword_boost = self.keyword_boost_component(venue, notes, pool_size);

        let score = self.weights.popularity_weight * popularity
            + self.weights.price_fit_weight * price_fit
            + self.weights.photo_weight * photo
            + keyword_boost;

        ScoredCandidate {
            venue: venue.clone(),
            score,
            breakdown: ScoreBreakdown {
                popularity,
                price_fit,
                photo,
                keyword_boost,
            },
        }
    }

    /// Applied at most once per venue: a configured term must appear in the
    /// free-text notes and in the venue's name or type text.
    fn keyword_boost_component(
        &self,
        venue: &Venue,
        notes: Option<&str>,
        pool_size: usize,
    ) -> f64 {
        let notes = match notes {
            Some(n) if !n.trim().is_empty() => n.to_lowercase(),
            _ => return 0.0,
        };

        let venue_text = format!("{} {}", venue.name, venue.types.join(" ")).to_lowercase();

        let hit = self
            .weights
            .boost_terms
            .iter()
            .any(|term| notes.contains(term.as_str()) && venue_text.contains(term.as_str()));

        if !hit {
            return 0.0;
        }
        if pool_size >= self.weights.large_pool_threshold {
            self.weights.keyword_boost_large_pool
        } else {
            self.weights.keyword_boost
        }
    }
}

/// Normalize a rating from [3.5, 5.0] onto [0, 1]. Missing or sub-floor
/// ratings are neutral, not penalized.
fn popularity_component(rating: Option<f64>) -> f64 {
    match rating {
        Some(r) if r >= RATING_FLOOR => {
            ((r - RATING_FLOOR) / (RATING_CEILING - RATING_FLOOR)).clamp(0.0, 1.0)
        }
        _ => NEUTRAL,
    }
}

fn price_fit_component(price_level: Option<u8>, profile: &PreferenceProfile) -> f64 {
    match price_level {
        Some(level) if profile.target_price_levels().contains(&level) => 1.0,
        // Outside the target range and unknown both land on neutral.
        _ => NEUTRAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::venue::Venue;

    fn venue(rating: Option<f64>, price: Option<u8>, has_photo: bool) -> Venue {
        Venue {
            place_id: "p1".to_string(),
            name: "Ribeira Market".to_string(),
            types: vec!["restaurant".to_string(), "food".to_string()],
            rating,
            price_level: price,
            coordinates: None,
            has_photo,
            address: None,
        }
    }

    fn profile() -> PreferenceProfile {
        PreferenceProfile::default()
    }

    #[test]
    fn perfect_venue_scores_one_without_boost() {
        let scorer = VenueScorer::new();
        let scored = scorer.score_pool(&[venue(Some(5.0), Some(2), true)], &profile(), None);
        assert!((scored[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn missing_data_is_neutral_not_penalized() {
        let scorer = VenueScorer::new();
        let scored = scorer.score_pool(&[venue(None, None, false)], &profile(), None);
        let b = &scored[0].breakdown;
        assert_eq!(b.popularity, 0.5);
        assert_eq!(b.price_fit, 0.5);
        assert_eq!(b.photo, 0.3);
    }

    #[test]
    fn low_rating_maps_to_neutral() {
        let scorer = VenueScorer::new();
        let scored = scorer.score_pool(&[venue(Some(2.0), Some(2), true)], &profile(), None);
        assert_eq!(scored[0].breakdown.popularity, 0.5);
    }

    #[test]
    fn rating_normalization_midpoint() {
        let scorer = VenueScorer::new();
        let scored = scorer.score_pool(&[venue(Some(4.25), Some(2), true)], &profile(), None);
        assert!((scored[0].breakdown.popularity - 0.5).abs() < 1e-9);
    }

    #[test]
    fn off_budget_price_is_half_credit() {
        let scorer = VenueScorer::new();
        let scored = scorer.score_pool(&[venue(Some(4.0), Some(4), true)], &profile(), None);
        assert_eq!(scored[0].breakdown.price_fit, 0.5);
    }

    #[test]
    fn keyword_boost_requires_term_in_notes_and_venue_text() {
        let scorer = VenueScorer::new();
        let pool = [venue(Some(4.0), Some(2), true)];

        let boosted = scorer.score_pool(&pool, &profile(), Some("we love a good market"));
        assert_eq!(boosted[0].breakdown.keyword_boost, 0.2);

        // Term in notes but not in venue text.
        let unboosted = scorer.score_pool(&pool, &profile(), Some("rooftop bars please"));
        assert_eq!(unboosted[0].breakdown.keyword_boost, 0.0);

        // No notes at all.
        let no_notes = scorer.score_pool(&pool, &profile(), None);
        assert_eq!(no_notes[0].breakdown.keyword_boost, 0.0);
    }

    #[test]
    fn large_pool_uses_bigger_boost() {
        let scorer = VenueScorer::new();
        let pool: Vec<Venue> = (0..100)
            .map(|i| {
                let mut v = venue(Some(4.0), Some(2), true);
                v.place_id = format!("p{}", i);
                v
            })
            .collect();
        let scored = scorer.score_pool(&pool, &profile(), Some("market day"));
        assert_eq!(scored[0].breakdown.keyword_boost, 0.25);
    }

    #[test]
    fn scores_stay_within_bounds() {
        let scorer = VenueScorer::new();
        let cases = [
            venue(Some(5.0), Some(2), true),
            venue(Some(0.0), None, false),
            venue(None, Some(4), true),
        ];
        let scored = scorer.score_pool(&cases, &profile(), Some("market sunset rooftop"));
        for candidate in scored {
            assert!(candidate.score >= 0.0);
            assert!(candidate.score <= 1.3, "score {} out of range", candidate.score);
        }
    }
}

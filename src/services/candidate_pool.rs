//! Builds the deduplicated candidate venue pool for one planning run via a
//! strict preference-filtered pass and a broadened fallback pass.

use std::collections::HashSet;

use crate::error::{PlanError, ShortfallKind};
use crate::models::preferences::{PaceTier, PreferenceProfile};
use crate::models::venue::Venue;
use crate::services::venue_source::{SearchFilters, VenueSource};

/// Travel-relevant type tags used for the broadened pass and the pre-flight
/// feasibility search.
pub const TRAVEL_TYPES: &[&str] = &[
    "tourist_attraction",
    "museum",
    "art_gallery",
    "restaurant",
    "cafe",
    "bar",
    "night_club",
    "park",
    "beach",
    "point_of_interest",
    "shopping_mall",
    "clothing_store",
    "spa",
    "movie_theater",
    "theater",
    "stadium",
    "zoo",
    "aquarium",
    "amusement_park",
    "church",
    "temple",
    "natural_feature",
];

const BROAD_QUERIES: &[&str] = &["things to do", "tourist attractions", "popular places"];

/// Per-day activity count target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayTarget {
    pub day: u32,
    pub min_activities: usize,
    pub max_activities: usize,
}

impl DayTarget {
    pub fn midpoint(&self) -> f64 {
        (self.min_activities + self.max_activities) as f64 / 2.0
    }
}

/// Activity count targets per day from the pace dial, with lighter first and
/// last days for arrival and departure.
pub fn calculate_daily_targets(pace_style: u8, total_days: u32) -> Vec<DayTarget> {
    let (base_min, base_max) = PaceTier::from_style(pace_style).base_daily_activities();

    (1..=total_days)
        .map(|day| {
            let edge_day = day == 1 || day == total_days;
            let (min_activities, max_activities) = if edge_day {
                (base_min.saturating_sub(1).max(2), base_max.saturating_sub(1).max(3))
            } else {
                (base_min, base_max)
            };
            DayTarget {
                day,
                min_activities,
                max_activities,
            }
        })
        .collect()
}

/// Total activities a full itinerary needs: sum of per-day target midpoints.
pub fn total_needed(targets: &[DayTarget]) -> usize {
    targets.iter().map(DayTarget::midpoint).sum::<f64>().round() as usize
}

#[derive(Debug, Clone)]
pub struct CandidatePoolConfig {
    /// Pool-size buffer multiplier over `total_needed`, per pace tier.
    pub buffer_relaxed: f64,
    pub buffer_moderate: f64,
    pub buffer_energetic: f64,
    /// Post-fetch minimum candidates per trip day, per pace tier.
    pub min_per_day_relaxed: f64,
    pub min_per_day_moderate: f64,
    pub min_per_day_energetic: f64,
    /// Pass B runs when Pass A yields fewer than this multiple of needed.
    pub broaden_below_factor: usize,
    pub search_radius_m: u32,
}

impl Default for CandidatePoolConfig {
    fn default() -> Self {
        Self {
            buffer_relaxed: 2.25,
            buffer_moderate: 2.75,
            buffer_energetic: 3.25,
            min_per_day_relaxed: 2.5,
            min_per_day_moderate: 3.0,
            min_per_day_energetic: 3.5,
            broaden_below_factor: 2,
            search_radius_m: 5_000,
        }
    }
}

impl CandidatePoolConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let parse = |name: &str, fallback: f64| {
            std::env::var(name)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(fallback)
        };
        Self {
            buffer_relaxed: parse("PLAN_POOL_BUFFER_RELAXED", defaults.buffer_relaxed),
            buffer_moderate: parse("PLAN_POOL_BUFFER_MODERATE", defaults.buffer_moderate),
            buffer_energetic: parse("PLAN_POOL_BUFFER_ENERGETIC", defaults.buffer_energetic),
            min_per_day_relaxed: parse("PLAN_POOL_MIN_PER_DAY_RELAXED", defaults.min_per_day_relaxed),
            min_per_day_moderate: parse(
                "PLAN_POOL_MIN_PER_DAY_MODERATE",
                defaults.min_per_day_moderate,
            ),
            min_per_day_energetic: parse(
                "PLAN_POOL_MIN_PER_DAY_ENERGETIC",
                defaults.min_per_day_energetic,
            ),
            ..defaults
        }
    }

    fn buffer_multiplier(&self, tier: PaceTier) -> f64 {
        match tier {
            PaceTier::Relaxed => self.buffer_relaxed,
            PaceTier::Moderate => self.buffer_moderate,
            PaceTier::Energetic => self.buffer_energetic,
        }
    }

    fn min_per_day(&self, tier: PaceTier) -> f64 {
        match tier {
            PaceTier::Relaxed => self.min_per_day_relaxed,
            PaceTier::Moderate => self.min_per_day_moderate,
            PaceTier::Energetic => self.min_per_day_energetic,
        }
    }
}

/// Trip-length-dependent bounds on the candidate pool target.
pub fn pool_window(total_days: u32) -> (usize, usize) {
    if total_days <= 3 {
        (50, 150)
    } else if total_days <= 5 {
        (80, 180)
    } else {
        (120, 220)
    }
}

/// The adaptive number of candidates one run tries to collect.
pub fn pool_target(targets: &[DayTarget], pace_style: u8, config: &CandidatePoolConfig) -> usize {
    let needed = total_needed(targets);
    let multiplier = config.buffer_multiplier(PaceTier::from_style(pace_style));
    let (min, max) = pool_window(targets.len() as u32);
    ((needed as f64 * multiplier).round() as usize).clamp(min, max)
}

/// Map selected interests to venue search queries. Unknown interests fall
/// back to their lowercased text.
pub fn interest_queries(profile: &PreferenceProfile) -> Vec<String> {
    let mut queries: Vec<String> = profile
        .selected_interests
        .iter()
        .map(|interest| match interest.as_str() {
            "Street food" => "street food markets food stalls".to_string(),
            "Fine dining" => "fine dining restaurants".to_string(),
            "Coffee & café hopping" => "cafes coffee shops".to_string(),
            "Food festivals" => "food markets festivals".to_string(),
            "Vintage & Thrift" => "vintage shops thrift stores".to_string(),
            "Luxury Boutiques" => "luxury shopping boutiques".to_string(),
            "Malls" => "shopping malls centers".to_string(),
            "Spas" => "spas wellness massage".to_string(),
            "Yoga" => "yoga studios wellness".to_string(),
            "Sunrise / Sunset Spots" => "scenic viewpoints sunset spots".to_string(),
            "Local Festivals" => "cultural events festivals".to_string(),
            "Architecture & Landmarks" => "landmarks monuments architecture".to_string(),
            "Museums" => "museums".to_string(),
            "Historical Tours" => "historical sites heritage".to_string(),
            "Live Music / Concerts" => "live music venues concert halls".to_string(),
            "Bar Crawls" => "bars pubs".to_string(),
            "Clubs" => "nightclubs dance clubs".to_string(),
            "Art Galleries" => "art galleries contemporary art".to_string(),
            "Film / Theatre Events" => "theaters cinema performing arts".to_string(),
            "Beach & Water Activities" => "beaches water sports".to_string(),
            "Hiking" => "hiking trails nature walks".to_string(),
            "Mountains & Scenic Views" => "mountains viewpoints scenic".to_string(),
            "Instagrammable Spots" => "photo spots scenic".to_string(),
            other => other.to_lowercase(),
        })
        .collect();

    queries.extend(profile.other_interests.iter().map(|s| s.to_lowercase()));

    if queries.is_empty() {
        queries.push("tourist attractions".to_string());
        queries.push("things to do".to_string());
    }
    queries
}

/// Result of the pool build, carried into scoring and selection.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    pub venues: Vec<Venue>,
    pub targets: Vec<DayTarget>,
    pub total_needed: usize,
}

/// Run the two-pass candidate search. Venue-source failures reduce the pool
/// rather than aborting; the post-fetch threshold decides whether the run
/// can continue.
pub async fn build_candidate_pool<S: VenueSource + ?Sized>(
    source: &S,
    destination: &str,
    profile: &PreferenceProfile,
    total_days: u32,
    config: &CandidatePoolConfig,
) -> Result<CandidatePool, PlanError> {
    let targets = calculate_daily_targets(profile.pace_style, total_days);
    let needed = total_needed(&targets);
    let target_size = pool_target(&targets, profile.pace_style, config);

    let mut venues: Vec<Venue> = Vec::new();
    let mut seen_ids: HashSet<String> = HashSet::new();

    // Pass A: interest queries, budget price filter, photos required.
    let strict_filters = SearchFilters {
        radius_m: config.search_radius_m,
        price_levels: Some(profile.target_price_levels().to_vec()),
        require_photo: true,
        ..SearchFilters::default()
    };

    'strict: for query in interest_queries(profile) {
        match source.search(destination, &query, &strict_filters).await {
            Ok(results) => {
                for venue in results {
                    if seen_ids.insert(venue.place_id.clone()) {
                        venues.push(venue);
                        if venues.len() >= target_size {
                            break 'strict;
                        }
                    }
                }
            }
            Err(e) => {
                log::warn!("strict search '{}' failed for {}: {}", query, destination, e);
            }
        }
    }
    let strict_count = venues.len();
    log::info!(
        "{}: strict pass collected {} candidates (target {})",
        destination,
        strict_count,
        target_size
    );

    // Pass B: broaden with the fixed travel type list, no preference filters.
    if venues.len() < config.broaden_below_factor * needed {
        let broad_filters = SearchFilters {
            radius_m: config.search_radius_m,
            allowed_types: Some(TRAVEL_TYPES.iter().map(|s| s.to_string()).collect()),
            ..SearchFilters::default()
        };

        'broad: for query in BROAD_QUERIES {
            match source.search(destination, query, &broad_filters).await {
                Ok(results) => {
                    for venue in results {
                        if seen_ids.insert(venue.place_id.clone()) {
                            venues.push(venue);
                            if venues.len() >= target_size {
                                break 'broad;
                            }
                        }
                    }
                }
                Err(e) => {
                    log::warn!(
                        "broadened search '{}' failed for {}: {}",
                        query,
                        destination,
                        e
                    );
                }
            }
        }
        log::info!(
            "{}: broadened pass grew pool to {} candidates",
            destination,
            venues.len()
        );
    }

    // Post-fetch feasibility threshold, scaled by pace and trip length.
    let tier = profile.pace_tier();
    let required = (config.min_per_day(tier) * total_days as f64).ceil() as usize;
    if venues.len() < required {
        let photoless = venues.iter().filter(|v| !v.has_photo).count();
        let kind = if venues.is_empty() {
            ShortfallKind::NoVenues
        } else if photoless * 2 > venues.len() {
            ShortfallKind::LowQuality
        } else {
            ShortfallKind::Sparse
        };
        return Err(PlanError::InsufficientCandidates {
            destination: destination.to_string(),
            requested_days: total_days,
            found: venues.len(),
            required,
            kind,
        });
    }

    Ok(CandidatePool {
        venues,
        targets,
        total_needed: needed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_targets_lighten_first_and_last_days() {
        let targets = calculate_daily_targets(80, 4);
        assert_eq!(targets[0].min_activities, 3);
        assert_eq!(targets[0].max_activities, 5);
        assert_eq!(targets[1].min_activities, 4);
        assert_eq!(targets[1].max_activities, 6);
        assert_eq!(targets[3].min_activities, 3);
        assert_eq!(targets[3].max_activities, 5);
    }

    #[test]
    fn relaxed_edge_days_floor_at_two_and_three() {
        let targets = calculate_daily_targets(10, 3);
        assert_eq!(targets[0].min_activities, 2);
        assert_eq!(targets[0].max_activities, 3);
        assert_eq!(targets[1].min_activities, 2);
        assert_eq!(targets[1].max_activities, 3);
    }

    #[test]
    fn single_day_trip_is_an_edge_day() {
        let targets = calculate_daily_targets(50, 1);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].min_activities, 2);
        assert_eq!(targets[0].max_activities, 3);
    }

    #[test]
    fn three_day_energetic_pool_target_clamps_into_short_window() {
        // Energetic 3-day trip: edge days (3,5), middle (4,6).
        let targets = calculate_daily_targets(90, 3);
        let needed = total_needed(&targets);
        assert_eq!(needed, 13);

        let target = pool_target(&targets, 90, &CandidatePoolConfig::default());
        assert_eq!(target, 50, "raw {}x buffer is below the window floor", needed);
    }

    #[test]
    fn pool_windows_by_trip_length() {
        assert_eq!(pool_window(2), (50, 150));
        assert_eq!(pool_window(3), (50, 150));
        assert_eq!(pool_window(4), (80, 180));
        assert_eq!(pool_window(5), (80, 180));
        assert_eq!(pool_window(6), (120, 220));
        assert_eq!(pool_window(14), (120, 220));
    }

    #[test]
    fn interest_queries_map_known_interests_and_lowercase_unknowns() {
        let mut profile = PreferenceProfile::default();
        profile.selected_interests =
            vec!["Museums".to_string(), "Ghost Tours".to_string()];
        let queries = interest_queries(&profile);
        assert!(queries.contains(&"museums".to_string()));
        assert!(queries.contains(&"ghost tours".to_string()));
    }

    #[test]
    fn no_interests_falls_back_to_generic_queries() {
        let queries = interest_queries(&PreferenceProfile::default());
        assert_eq!(
            queries,
            vec!["tourist attractions".to_string(), "things to do".to_string()]
        );
    }
}

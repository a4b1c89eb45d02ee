//! End-to-end itinerary planning pipeline.
//!
//! One `generate_plan` call runs pre-flight feasibility, candidate pooling,
//! scoring, diversity selection, day clustering, route ordering, and assembly
//! with backfill. The venue source and the text generator are injected so the
//! whole pipeline runs against fakes in tests.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::PlanError;
use crate::models::plan::{DataQuality, DayPlan, ItineraryPlan, PlanRequest, PlannedActivity};
use crate::models::preferences::PreferenceProfile;
use crate::models::venue::Venue;
use crate::services::candidate_pool::{
    build_candidate_pool, CandidatePoolConfig, DayTarget, TRAVEL_TYPES,
};
use crate::services::categorizer::categorize;
use crate::services::diversity::{DiversityConfig, DiversitySelector};
use crate::services::feasibility::{
    Feasibility, FeasibilityConfig, FeasibilityGate, PREFLIGHT_MAX_PAGES, PREFLIGHT_QUERY,
    PREFLIGHT_RADIUS_M,
};
use crate::services::geo::{cluster_venues_by_days, haversine_distance, ClusterStrategy};
use crate::services::preference_aggregator::aggregate_preferences;
use crate::services::route_optimization::optimize_daily_route;
use crate::services::scoring::{ScoreWeights, ScoredCandidate, VenueScorer};
use crate::services::text_generation::{
    fallback_time_slots, fallback_trip_notes, resolve_day_times, TextGenerator,
};
use crate::services::venue_source::{SearchFilters, VenueSource};

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub feasibility: FeasibilityConfig,
    pub pool: CandidatePoolConfig,
    pub weights: ScoreWeights,
    pub diversity: DiversityConfig,
    pub cluster_strategy: ClusterStrategy,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            feasibility: FeasibilityConfig::default(),
            pool: CandidatePoolConfig::default(),
            weights: ScoreWeights::default(),
            diversity: DiversityConfig::default(),
            // Strided init keeps identical requests producing identical plans.
            cluster_strategy: ClusterStrategy::Strided,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Self {
        Self {
            feasibility: FeasibilityConfig::from_env(),
            pool: CandidatePoolConfig::from_env(),
            weights: ScoreWeights::from_env(),
            diversity: DiversityConfig::from_env(),
            cluster_strategy: ClusterStrategy::Strided,
        }
    }
}

pub struct ItineraryPlanner {
    venue_source: Arc<dyn VenueSource>,
    text_generator: Option<Arc<dyn TextGenerator>>,
    config: PlannerConfig,
}

impl ItineraryPlanner {
    pub fn new(venue_source: Arc<dyn VenueSource>) -> Self {
        Self {
            venue_source,
            text_generator: None,
            config: PlannerConfig::default(),
        }
    }

    pub fn with_text_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.text_generator = Some(generator);
        self
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the whole pipeline for one request.
    pub async fn generate_plan(&self, request: &PlanRequest) -> Result<ItineraryPlan, PlanError> {
        let total_days = request.trip_days()?;
        let destination = request.destination.trim();
        if destination.is_empty() {
            return Err(PlanError::InvalidRequest("destination is empty".to_string()));
        }

        let profile = aggregate_preferences(&request.preferences);
        log::info!(
            "planning {} days in {} for {} traveler(s)",
            total_days,
            destination,
            profile.participant_count.max(1)
        );

        // Pre-flight gate on a broad, cheap search. A source failure here
        // counts as zero venues rather than a distinct error path.
        let preflight_count = self.preflight_count(destination).await;
        let data_quality = match FeasibilityGate::with_config(self.config.feasibility.clone())
            .assess(preflight_count)
        {
            Feasibility::Reject => {
                return Err(PlanError::InfeasibleDestination {
                    destination: destination.to_string(),
                    venue_count: preflight_count,
                })
            }
            Feasibility::ProceedWithWarning => {
                log::warn!(
                    "{}: only {} venues in pre-flight, plan quality may be limited",
                    destination,
                    preflight_count
                );
                DataQuality::Limited
            }
            Feasibility::Proceed => DataQuality::Full,
        };

        let pool = build_candidate_pool(
            self.venue_source.as_ref(),
            destination,
            &profile,
            total_days,
            &self.config.pool,
        )
        .await?;

        let scorer = VenueScorer::with_weights(self.config.weights.clone());
        let scored = scorer.score_pool(&pool.venues, &profile, request.notes.as_deref());

        let selector = DiversitySelector::with_config(self.config.diversity.clone());
        let chosen = selector.select(&scored, pool.total_needed);

        // Scored-but-unchosen candidates become the shared backfill pool,
        // best first. It is consumed across days; a venue pulled for one day
        // is gone for the rest.
        let mut backfill = leftover_pool(&scored, &chosen);

        let chosen_venues: Vec<Venue> = chosen.into_iter().map(|c| c.venue).collect();
        let clusters = cluster_venues_by_days(
            &chosen_venues,
            total_days as usize,
            self.config.cluster_strategy,
        );

        let mut days = Vec::with_capacity(pool.targets.len());
        for (cluster, target) in clusters.into_iter().zip(&pool.targets) {
            let venues = assemble_day(cluster, target, &mut backfill);
            days.push(self.finish_day(destination, venues, target, &profile).await);
        }

        let notes = match &self.text_generator {
            Some(generator) => match generator.trip_notes(destination, total_days).await {
                Ok(notes) if !notes.is_empty() => notes,
                Ok(_) => fallback_trip_notes(),
                Err(e) => {
                    log::warn!("trip note generation failed: {}, using fallback notes", e);
                    fallback_trip_notes()
                }
            },
            None => fallback_trip_notes(),
        };

        Ok(ItineraryPlan {
            destination: destination.to_string(),
            total_days,
            dates: request.date_range_display(),
            data_quality,
            days,
            notes,
        })
    }

    async fn preflight_count(&self, destination: &str) -> usize {
        let filters = SearchFilters {
            radius_m: PREFLIGHT_RADIUS_M,
            allowed_types: Some(TRAVEL_TYPES.iter().map(|s| s.to_string()).collect()),
            max_pages: PREFLIGHT_MAX_PAGES,
            ..SearchFilters::default()
        };
        match self
            .venue_source
            .search(destination, PREFLIGHT_QUERY, &filters)
            .await
        {
            Ok(venues) => venues.len(),
            Err(e) => {
                log::warn!("pre-flight search failed for {}: {}", destination, e);
                0
            }
        }
    }

    /// Route-order a day's venues, attach times and pairwise distances.
    async fn finish_day(
        &self,
        destination: &str,
        venues: Vec<Venue>,
        target: &DayTarget,
        profile: &PreferenceProfile,
    ) -> DayPlan {
        let ordered = optimize_daily_route(venues);

        let names: Vec<String> = ordered.iter().map(|v| v.name.clone()).collect();
        let times = match &self.text_generator {
            Some(generator) => resolve_day_times(
                generator
                    .day_time_labels(destination, &names, profile.schedule_style)
                    .await,
                ordered.len(),
                profile.schedule_style,
            ),
            None => fallback_time_slots(ordered.len(), profile.schedule_style),
        };

        let mut activities: Vec<PlannedActivity> = ordered
            .into_iter()
            .zip(times)
            .map(|(venue, time)| PlannedActivity {
                category: categorize(&venue.types),
                place_id: venue.place_id,
                name: venue.name,
                time,
                location: venue.address,
                coordinates: venue.coordinates,
                rating: venue.rating,
                distance_to_next_km: None,
            })
            .collect();

        for i in 0..activities.len().saturating_sub(1) {
            if let (Some(a), Some(b)) = (activities[i].coordinates, activities[i + 1].coordinates)
            {
                let km = haversine_distance(a.lat, a.lng, b.lat, b.lng);
                activities[i].distance_to_next_km = Some((km * 100.0).round() / 100.0);
            }
        }

        DayPlan {
            day: target.day,
            min_activities: target.min_activities,
            max_activities: target.max_activities,
            activities,
        }
    }
}

/// Scored candidates not taken by selection, best score first.
fn leftover_pool(scored: &[ScoredCandidate], chosen: &[ScoredCandidate]) -> VecDeque<Venue> {
    let chosen_ids: std::collections::HashSet<&str> =
        chosen.iter().map(|c| c.venue.place_id.as_str()).collect();

    let mut leftovers: Vec<&ScoredCandidate> = scored
        .iter()
        .filter(|c| !chosen_ids.contains(c.venue.place_id.as_str()))
        .collect();
    leftovers.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    leftovers.into_iter().map(|c| c.venue.clone()).collect()
}

/// Cap a day's cluster at its midpoint target (floored, so a (3,4) day aims
/// for 3) and top up any shortfall from the shared backfill pool. Overflow
/// venues rejoin the pool at the front, ahead of the unchosen leftovers.
fn assemble_day(
    cluster: Vec<Venue>,
    target: &DayTarget,
    backfill: &mut VecDeque<Venue>,
) -> Vec<Venue> {
    let goal = target.midpoint().floor() as usize;

    let mut venues = cluster;
    while venues.len() > goal {
        if let Some(extra) = venues.pop() {
            backfill.push_front(extra);
        }
    }

    while venues.len() < goal {
        match backfill.pop_front() {
            Some(venue) => venues.push(venue),
            None => {
                log::warn!(
                    "day {} ships with {} of {} activities, backfill pool is empty",
                    target.day,
                    venues.len(),
                    goal
                );
                break;
            }
        }
    }

    venues
}

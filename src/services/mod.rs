pub mod candidate_pool;
pub mod categorizer;
pub mod diversity;
pub mod feasibility;
pub mod geo;
pub mod itinerary_generation;
pub mod preference_aggregator;
pub mod route_optimization;
pub mod scoring;
pub mod text_generation;
pub mod venue_source;

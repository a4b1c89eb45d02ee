//! Orders venues within a single day to keep travel short.
//!
//! Nearest-neighbor heuristic only; no backtracking or 2-opt pass.

use crate::models::venue::Venue;
use crate::services::geo::haversine_distance;

/// Reorder one day's venues: start at the first coordinate-bearing venue and
/// repeatedly hop to the closest unvisited one. Venues without coordinates
/// keep their original order at the end of the day.
pub fn optimize_daily_route(venues: Vec<Venue>) -> Vec<Venue> {
    if venues.len() <= 1 {
        return venues;
    }

    let (mut remaining, without_coords): (Vec<Venue>, Vec<Venue>) = venues
        .into_iter()
        .partition(|v| v.coordinates.is_some());

    if remaining.is_empty() {
        return without_coords;
    }

    let mut route = vec![remaining.remove(0)];

    while !remaining.is_empty() {
        let current = route.last().unwrap().coordinates.unwrap();

        let mut nearest_idx = 0;
        let mut nearest_dist = f64::INFINITY;
        for (idx, venue) in remaining.iter().enumerate() {
            let c = venue.coordinates.unwrap();
            let dist = haversine_distance(current.lat, current.lng, c.lat, c.lng);
            if dist < nearest_dist {
                nearest_dist = dist;
                nearest_idx = idx;
            }
        }

        route.push(remaining.remove(nearest_idx));
    }

    route.extend(without_coords);
    route
}

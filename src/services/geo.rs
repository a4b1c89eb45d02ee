//! Geographic primitives: great-circle distance and day clustering.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::models::venue::Venue;

const EARTH_RADIUS_KM: f64 = 6371.0;
const CLUSTER_ITERATIONS: usize = 3;

/// Great-circle distance between two points, in kilometers.
///
/// NaN inputs propagate; callers validate coordinates.
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// How the clusterer picks its initial centers. `Seeded` gives reproducible
/// random sampling; `Strided` spreads centers evenly through the venue list
/// in discovery order and is fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterStrategy {
    Seeded(u64),
    Strided,
}

/// Partition venues into one group per trip day by geographic proximity.
///
/// Runs a fixed three iterations of nearest-center assignment, snapping each
/// recomputed center to the member venue closest to the cluster centroid so
/// centers are always real venues. Venues without coordinates are set aside
/// and round-robin distributed across the day buckets at the end.
pub fn cluster_venues_by_days(
    venues: &[Venue],
    num_days: usize,
    strategy: ClusterStrategy,
) -> Vec<Vec<Venue>> {
    if num_days == 0 {
        return Vec::new();
    }

    let valid: Vec<&Venue> = venues.iter().filter(|v| v.coordinates.is_some()).collect();
    let invalid: Vec<&Venue> = venues.iter().filter(|v| v.coordinates.is_none()).collect();

    if valid.is_empty() {
        return distribute_evenly(venues, num_days);
    }

    if valid.len() <= num_days {
        // One venue per day; remaining days stay empty.
        let mut clusters: Vec<Vec<Venue>> = vec![Vec::new(); num_days];
        for (i, venue) in valid.iter().enumerate() {
            clusters[i].push((*venue).clone());
        }
        for (i, venue) in invalid.iter().enumerate() {
            clusters[i % num_days].push((*venue).clone());
        }
        return clusters;
    }

    let mut centers: Vec<&Venue> = match strategy {
        ClusterStrategy::Seeded(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            valid.choose_multiple(&mut rng, num_days).copied().collect()
        }
        ClusterStrategy::Strided => {
            let step = valid.len() / num_days;
            (0..num_days).map(|i| valid[i * step]).collect()
        }
    };

    for _ in 0..CLUSTER_ITERATIONS {
        let clusters = assign_to_centers(&valid, &centers);

        for (i, cluster) in clusters.iter().enumerate() {
            // An empty cluster keeps its previous center.
            if cluster.is_empty() {
                continue;
            }
            let count = cluster.len() as f64;
            let avg_lat = cluster
                .iter()
                .map(|v| v.coordinates.unwrap().lat)
                .sum::<f64>()
                / count;
            let avg_lng = cluster
                .iter()
                .map(|v| v.coordinates.unwrap().lng)
                .sum::<f64>()
                / count;

            let mut best = cluster[0];
            let mut best_dist = f64::INFINITY;
            for venue in cluster {
                let c = venue.coordinates.unwrap();
                let dist = haversine_distance(c.lat, c.lng, avg_lat, avg_lng);
                if dist < best_dist {
                    best_dist = dist;
                    best = venue;
                }
            }
            centers[i] = best;
        }
    }

    let final_assignment = assign_to_centers(&valid, &centers);
    let mut clusters: Vec<Vec<Venue>> = final_assignment
        .into_iter()
        .map(|group| group.into_iter().cloned().collect())
        .collect();

    for (i, venue) in invalid.iter().enumerate() {
        clusters[i % num_days].push((*venue).clone());
    }

    clusters
}

fn assign_to_centers<'a>(venues: &[&'a Venue], centers: &[&Venue]) -> Vec<Vec<&'a Venue>> {
    let mut clusters: Vec<Vec<&Venue>> = vec![Vec::new(); centers.len()];

    for venue in venues {
        let v = venue.coordinates.unwrap();
        let mut nearest_idx = 0;
        let mut nearest_dist = f64::INFINITY;

        for (i, center) in centers.iter().enumerate() {
            let c = center.coordinates.unwrap();
            let dist = haversine_distance(v.lat, v.lng, c.lat, c.lng);
            if dist < nearest_dist {
                nearest_dist = dist;
                nearest_idx = i;
            }
        }

        clusters[nearest_idx].push(venue);
    }

    clusters
}

/// Fallback grouping when no venue has coordinates.
pub fn distribute_evenly(venues: &[Venue], num_groups: usize) -> Vec<Vec<Venue>> {
    let mut groups: Vec<Vec<Venue>> = vec![Vec::new(); num_groups];
    for (i, venue) in venues.iter().enumerate() {
        groups[i % num_groups].push(venue.clone());
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::venue::Coordinates;

    fn venue_at(id: &str, lat: f64, lng: f64) -> Venue {
        Venue {
            place_id: id.to_string(),
            name: id.to_string(),
            types: vec!["tourist_attraction".to_string()],
            rating: Some(4.2),
            price_level: Some(2),
            coordinates: Some(Coordinates { lat, lng }),
            has_photo: true,
            address: None,
        }
    }

    fn venue_no_coords(id: &str) -> Venue {
        let mut v = venue_at(id, 0.0, 0.0);
        v.coordinates = None;
        v
    }

    #[test]
    fn haversine_is_symmetric() {
        let d1 = haversine_distance(48.8566, 2.3522, 51.5074, -0.1278);
        let d2 = haversine_distance(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((d1 - d2).abs() < 1e-9);
    }

    #[test]
    fn haversine_of_identical_points_is_zero() {
        assert_eq!(haversine_distance(40.0, -3.7, 40.0, -3.7), 0.0);
    }

    #[test]
    fn haversine_paris_to_london_is_about_344_km() {
        let d = haversine_distance(48.8566, 2.3522, 51.5074, -0.1278);
        assert!((d - 344.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn clustering_with_fewer_venues_than_days_is_trivial() {
        let venues = vec![venue_at("a", 40.0, -3.0), venue_at("b", 41.0, -3.0)];
        let clusters = cluster_venues_by_days(&venues, 4, ClusterStrategy::Strided);
        assert_eq!(clusters.len(), 4);
        assert_eq!(clusters[0].len(), 1);
        assert_eq!(clusters[1].len(), 1);
        assert!(clusters[2].is_empty());
        assert!(clusters[3].is_empty());
    }

    #[test]
    fn clustering_without_coordinates_distributes_evenly() {
        let venues = vec![
            venue_no_coords("a"),
            venue_no_coords("b"),
            venue_no_coords("c"),
        ];
        let clusters = cluster_venues_by_days(&venues, 2, ClusterStrategy::Strided);
        assert_eq!(clusters[0].len(), 2);
        assert_eq!(clusters[1].len(), 1);
    }

    #[test]
    fn clustering_groups_nearby_venues_together() {
        // Two tight groups far apart plus a lone outlier.
        let venues = vec![
            venue_at("p1", 48.85, 2.35),
            venue_at("p2", 48.86, 2.36),
            venue_at("p3", 48.87, 2.34),
            venue_at("l1", 51.50, -0.12),
            venue_at("l2", 51.51, -0.13),
            venue_at("l3", 51.52, -0.11),
            venue_at("m1", 40.41, -3.70),
            venue_at("m2", 40.42, -3.69),
            venue_at("m3", 40.40, -3.71),
        ];
        let clusters = cluster_venues_by_days(&venues, 3, ClusterStrategy::Strided);
        for cluster in &clusters {
            assert!(!cluster.is_empty());
            let prefix = &cluster[0].place_id[..1];
            for venue in cluster {
                assert!(venue.place_id.starts_with(prefix));
            }
        }
    }

    #[test]
    fn seeded_clustering_is_deterministic() {
        let venues: Vec<Venue> = (0..12)
            .map(|i| venue_at(&format!("v{}", i), 40.0 + (i as f64) * 0.3, -3.0 - (i as f64) * 0.2))
            .collect();

        let first = cluster_venues_by_days(&venues, 3, ClusterStrategy::Seeded(7));
        let second = cluster_venues_by_days(&venues, 3, ClusterStrategy::Seeded(7));

        let ids = |clusters: &[Vec<Venue>]| -> Vec<Vec<String>> {
            clusters
                .iter()
                .map(|c| c.iter().map(|v| v.place_id.clone()).collect())
                .collect()
        };
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn coordinate_less_venues_are_round_robined_onto_clusters() {
        let mut venues: Vec<Venue> = (0..8)
            .map(|i| venue_at(&format!("v{}", i), 40.0 + (i as f64) * 0.5, -3.0))
            .collect();
        venues.push(venue_no_coords("x1"));
        venues.push(venue_no_coords("x2"));

        let clusters = cluster_venues_by_days(&venues, 2, ClusterStrategy::Strided);
        let total: usize = clusters.iter().map(|c| c.len()).sum();
        assert_eq!(total, 10);
        assert!(clusters[0].iter().any(|v| v.place_id == "x1"));
        assert!(clusters[1].iter().any(|v| v.place_id == "x2"));
    }
}

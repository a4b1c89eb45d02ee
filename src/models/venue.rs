use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A real-world place candidate returned by a venue source.
///
/// Venues are immutable once fetched. The same `place_id` may come back from
/// several search passes in one planning run; deduplication happens in the
/// candidate pool, keyed on that identifier.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Venue {
    pub place_id: String,
    pub name: String,
    /// Source type tags, ordered; the first matching tag decides the category.
    pub types: Vec<String>,
    /// Rating on a 0-5 scale. Sources reporting 0-10 are normalized at
    /// ingestion via [`Venue::normalize_rating`].
    pub rating: Option<f64>,
    /// Price tier 1-4, when the source knows it.
    pub price_level: Option<u8>,
    pub coordinates: Option<Coordinates>,
    pub has_photo: bool,
    pub address: Option<String>,
}

impl Venue {
    /// Bring a raw source rating onto the 0-5 scale used everywhere else.
    pub fn normalize_rating(raw: f64) -> f64 {
        if raw > 5.0 {
            (raw / 2.0).min(5.0)
        } else {
            raw.max(0.0)
        }
    }

    pub fn lat_lng(&self) -> Option<(f64, f64)> {
        self.coordinates.map(|c| (c.lat, c.lng))
    }
}

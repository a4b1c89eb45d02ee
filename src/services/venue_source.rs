//! Venue sourcing behind a mockable seam, with a Google Places implementation.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::models::venue::{Coordinates, Venue};

const GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
// Google requires a short wait before a next_page_token becomes valid.
const PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum VenueSourceError {
    #[error("GOOGLE_MAPS_API_KEY environment variable not set")]
    MissingApiKey,
    #[error("geocoding failed for {destination}: {status}")]
    Geocoding { destination: String, status: String },
    #[error("venue search failed: {0}")]
    Api(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Filters applied server-side or post-fetch for one search call.
#[derive(Debug, Clone)]
pub struct SearchFilters {
    pub radius_m: u32,
    pub min_rating: Option<f64>,
    /// Acceptable price tiers 1-4. `None` means no price filtering.
    pub price_levels: Option<Vec<u8>>,
    pub require_photo: bool,
    /// Keep only venues carrying at least one of these type tags.
    pub allowed_types: Option<Vec<String>>,
    pub max_pages: u32,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            radius_m: 5_000,
            min_rating: None,
            price_levels: None,
            require_photo: false,
            allowed_types: None,
            max_pages: 1,
        }
    }
}

/// External venue search. Implementations must be safe to call repeatedly
/// with different filters within one planning run; the candidate pool
/// deduplicates by `place_id` across calls.
#[async_trait]
pub trait VenueSource: Send + Sync {
    async fn search(
        &self,
        destination: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Venue>, VenueSourceError>;
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    place_id: Option<String>,
    name: Option<String>,
    formatted_address: Option<String>,
    rating: Option<f64>,
    price_level: Option<u8>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    photos: Vec<PhotoRef>,
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct PhotoRef {
    photo_reference: Option<String>,
}

/// Google Places Text Search venue source.
pub struct GooglePlacesSource {
    http_client: reqwest::Client,
    api_key: String,
}

impl GooglePlacesSource {
    pub fn new() -> Result<Self, VenueSourceError> {
        let api_key =
            env::var("GOOGLE_MAPS_API_KEY").map_err(|_| VenueSourceError::MissingApiKey)?;

        let http_client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        Ok(Self {
            http_client,
            api_key,
        })
    }

    /// Geocode a destination string to anchor coordinates for searching.
    async fn geocode(&self, destination: &str) -> Result<Coordinates, VenueSourceError> {
        let response = self
            .http_client
            .get(GEOCODE_URL)
            .query(&[("address", destination), ("key", &self.api_key)])
            .send()
            .await?;

        let data: GeocodeResponse = response.json().await?;
        if data.status != "OK" {
            return Err(VenueSourceError::Geocoding {
                destination: destination.to_string(),
                status: data.status,
            });
        }

        let location = data
            .results
            .first()
            .map(|r| &r.geometry.location)
            .ok_or_else(|| VenueSourceError::Geocoding {
                destination: destination.to_string(),
                status: "ZERO_RESULTS".to_string(),
            })?;

        Ok(Coordinates {
            lat: location.lat,
            lng: location.lng,
        })
    }

    fn accept(place: &PlaceResult, filters: &SearchFilters) -> bool {
        if let Some(min_rating) = filters.min_rating {
            if place.rating.unwrap_or(0.0) < min_rating {
                return false;
            }
        }
        if let Some(levels) = &filters.price_levels {
            match place.price_level {
                Some(level) if levels.contains(&level) => {}
                _ => return false,
            }
        }
        if filters.require_photo {
            let has_photo = place
                .photos
                .first()
                .map(|p| p.photo_reference.is_some())
                .unwrap_or(false);
            if !has_photo {
                return false;
            }
        }
        if let Some(allowed) = &filters.allowed_types {
            if !place.types.iter().any(|t| allowed.contains(t)) {
                return false;
            }
        }
        true
    }

    fn to_venue(place: PlaceResult) -> Option<Venue> {
        let place_id = place.place_id?;
        let name = place.name?;
        let has_photo = place
            .photos
            .first()
            .map(|p| p.photo_reference.is_some())
            .unwrap_or(false);
        let coordinates = place.geometry.map(|g| Coordinates {
            lat: g.location.lat,
            lng: g.location.lng,
        });

        Some(Venue {
            place_id,
            name,
            types: place.types,
            rating: place.rating.map(Venue::normalize_rating),
            price_level: place.price_level,
            coordinates,
            has_photo,
            address: place.formatted_address,
        })
    }
}

#[async_trait]
impl VenueSource for GooglePlacesSource {
    async fn search(
        &self,
        destination: &str,
        query: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Venue>, VenueSourceError> {
        let anchor = self.geocode(destination).await?;

        let mut collected = Vec::new();
        let mut pages_fetched = 0u32;
        let mut next_token: Option<String> = None;

        loop {
            let request = if let Some(token) = &next_token {
                self.http_client
                    .get(TEXT_SEARCH_URL)
                    .query(&[("pagetoken", token.as_str()), ("key", &self.api_key)])
            } else {
                self.http_client.get(TEXT_SEARCH_URL).query(&[
                    ("query", query),
                    ("location", &format!("{},{}", anchor.lat, anchor.lng)),
                    ("radius", &filters.radius_m.to_string()),
                    ("key", &self.api_key),
                ])
            };

            let response = request.send().await?;
            let data: TextSearchResponse = response.json().await?;

            match data.status.as_str() {
                "OK" | "ZERO_RESULTS" => {}
                // A freshly issued page token briefly returns INVALID_REQUEST.
                "INVALID_REQUEST" if next_token.is_some() => {
                    tokio::time::sleep(PAGE_TOKEN_DELAY).await;
                    continue;
                }
                status => return Err(VenueSourceError::Api(status.to_string())),
            }

            collected.extend(
                data.results
                    .into_iter()
                    .filter(|p| Self::accept(p, filters))
                    .filter_map(Self::to_venue),
            );

            pages_fetched += 1;
            next_token = data.next_page_token;

            if next_token.is_none() || pages_fetched >= filters.max_pages {
                break;
            }
            tokio::time::sleep(PAGE_TOKEN_DELAY).await;
        }

        log::debug!(
            "places search '{}' near {} returned {} venues over {} page(s)",
            query,
            destination,
            collected.len(),
            pages_fetched
        );

        Ok(collected)
    }
}

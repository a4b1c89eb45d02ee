//! Display-time and trip-note generation behind a best-effort seam.
//!
//! The planner never depends on this collaborator succeeding: a failure or a
//! wrong-shaped reply falls back to the fixed rotating slot table and a
//! generic notes list.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
const HTTP_TIMEOUT: Duration = Duration::from_secs(15);

// Same slider bands as the pace dial.
const EARLY_RISER_MAX: u8 = 33;
const NIGHT_OWL_MIN: u8 = 66;

const BASE_SLOTS: [&str; 5] = ["9:00 AM", "11:30 AM", "2:00 PM", "4:30 PM", "7:00 PM"];
const EARLY_SLOTS: [&str; 5] = ["8:00 AM", "10:30 AM", "1:00 PM", "3:30 PM", "6:00 PM"];
const LATE_SLOTS: [&str; 5] = ["10:00 AM", "12:30 PM", "3:00 PM", "5:30 PM", "8:00 PM"];

const FALLBACK_NOTES: [&str; 3] = [
    "Check opening hours before visiting each venue",
    "Book popular restaurants and attractions in advance",
    "Keep some flexibility for weather and local events",
];

#[derive(Debug, Error)]
pub enum TextGenerationError {
    #[error("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    #[error("text generation failed: {0}")]
    Api(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Best-effort text collaborator for display times and advisory notes.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Return one display-time string per venue, in venue order.
    async fn day_time_labels(
        &self,
        destination: &str,
        venue_names: &[String],
        schedule_style: u8,
    ) -> Result<Vec<String>, TextGenerationError>;

    /// Return a short list of advisory notes for the whole trip.
    async fn trip_notes(
        &self,
        destination: &str,
        total_days: u32,
    ) -> Result<Vec<String>, TextGenerationError>;
}

/// Fixed rotating time slots, shifted one notch by the schedule dial: early
/// risers below the midpoint band, night owls above it.
pub fn fallback_time_slots(count: usize, schedule_style: u8) -> Vec<String> {
    let table = if schedule_style <= EARLY_RISER_MAX {
        &EARLY_SLOTS
    } else if schedule_style > NIGHT_OWL_MIN {
        &LATE_SLOTS
    } else {
        &BASE_SLOTS
    };
    (0..count).map(|i| table[i % table.len()].to_string()).collect()
}

pub fn fallback_trip_notes() -> Vec<String> {
    FALLBACK_NOTES.iter().map(|s| s.to_string()).collect()
}

/// Accept generated times only when the shape matches; otherwise log and use
/// the deterministic slots.
pub fn resolve_day_times(
    generated: Result<Vec<String>, TextGenerationError>,
    count: usize,
    schedule_style: u8,
) -> Vec<String> {
    match generated {
        Ok(times) if times.len() == count => times,
        Ok(times) => {
            log::warn!(
                "time generation returned {} labels for {} venues, using fallback slots",
                times.len(),
                count
            );
            fallback_time_slots(count, schedule_style)
        }
        Err(e) => {
            log::warn!("time generation failed: {}, using fallback slots", e);
            fallback_time_slots(count, schedule_style)
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gemini-backed generator. Replies are requested as one item per line and
/// parsed line-wise; anything surprising surfaces as an error and the caller
/// falls back.
pub struct GeminiTextGenerator {
    http_client: reqwest::Client,
    api_key: String,
}

impl GeminiTextGenerator {
    pub fn new() -> Result<Self, TextGenerationError> {
        let api_key =
            env::var("GEMINI_API_KEY").map_err(|_| TextGenerationError::MissingApiKey)?;
        let http_client = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            http_client,
            api_key,
        })
    }

    async fn generate(&self, prompt: String) -> Result<Vec<String>, TextGenerationError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(GEMINI_URL)
            .query(&[("key", &self.api_key)])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TextGenerationError::Api(format!(
                "status {}",
                response.status()
            )));
        }

        let data: GenerateResponse = response.json().await?;
        let text = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| TextGenerationError::Api("empty reply".to_string()))?;

        Ok(text
            .lines()
            .map(|line| {
                line.trim()
                    .trim_start_matches(|c: char| c == '-' || c == '*' || c == ' ')
                    .to_string()
            })
            .filter(|line| !line.is_empty())
            .collect())
    }
}

#[async_trait]
impl TextGenerator for GeminiTextGenerator {
    async fn day_time_labels(
        &self,
        destination: &str,
        venue_names: &[String],
        schedule_style: u8,
    ) -> Result<Vec<String>, TextGenerationError> {
        let tempo = if schedule_style <= EARLY_RISER_MAX {
            "an early-riser"
        } else if schedule_style > NIGHT_OWL_MIN {
            "a night-owl"
        } else {
            "a balanced"
        };
        let prompt = format!(
            "Assign a realistic visiting time to each stop of {} schedule in {}.\n\
             Reply with exactly {} lines, one time like '9:00 AM' per line, in order:\n{}",
            tempo,
            destination,
            venue_names.len(),
            venue_names.join("\n"),
        );
        self.generate(prompt).await
    }

    async fn trip_notes(
        &self,
        destination: &str,
        total_days: u32,
    ) -> Result<Vec<String>, TextGenerationError> {
        let prompt = format!(
            "Give 3 short practical travel tips for a {}-day trip to {}. \
             Reply with one tip per line, no numbering.",
            total_days, destination,
        );
        self.generate(prompt).await
    }
}

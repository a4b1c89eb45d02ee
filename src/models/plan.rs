use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::PlanError;
use crate::models::preferences::PreferenceDocument;
use crate::models::venue::Coordinates;
use crate::services::categorizer::ActivityCategory;

pub const MAX_TRIP_DAYS: u32 = 30;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Solo,
    Group,
}

/// One planning invocation as submitted by the application layer.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlanRequest {
    pub destination: String,
    pub trip_type: TripType,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Explicit day count, used when no date range is given.
    pub duration_days: Option<u32>,
    /// One document for solo trips, one per traveler for group trips.
    #[serde(default)]
    pub preferences: Vec<PreferenceDocument>,
    /// Free-text trip notes, consumed by keyword boosting only.
    pub notes: Option<String>,
}

impl PlanRequest {
    /// Trip length in days, from the date range when present, otherwise from
    /// the explicit duration.
    pub fn trip_days(&self) -> Result<u32, PlanError> {
        let days = match (self.start_date, self.end_date, self.duration_days) {
            (Some(start), Some(end), _) => {
                let span = (end - start).num_days();
                if span < 0 {
                    return Err(PlanError::InvalidRequest(format!(
                        "end date {} is before start date {}",
                        end, start
                    )));
                }
                span as u32 + 1
            }
            (_, _, Some(days)) => days,
            _ => {
                return Err(PlanError::InvalidRequest(
                    "either a date range or duration_days is required".to_string(),
                ))
            }
        };

        if days == 0 {
            return Err(PlanError::InvalidRequest("trip length is zero days".to_string()));
        }
        if days > MAX_TRIP_DAYS {
            return Err(PlanError::InvalidRequest(format!(
                "trip length {} exceeds the {} day maximum",
                days, MAX_TRIP_DAYS
            )));
        }
        Ok(days)
    }

    /// Display string for the requested dates, when both ends are known.
    pub fn date_range_display(&self) -> Option<String> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(format!(
                "{} - {}",
                start.format("%B %-d, %Y"),
                end.format("%B %-d, %Y")
            )),
            _ => None,
        }
    }
}

/// One scheduled activity inside a day plan.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PlannedActivity {
    pub place_id: String,
    pub name: String,
    pub category: ActivityCategory,
    /// Display time slot; generated text when available, deterministic
    /// fallback otherwise. Never empty in a finished plan.
    pub time: String,
    pub location: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub rating: Option<f64>,
    /// Haversine distance to the next activity of the day, when both ends
    /// have coordinates. Never estimated.
    pub distance_to_next_km: Option<f64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DayPlan {
    /// 1-based day ordinal.
    pub day: u32,
    pub min_activities: usize,
    pub max_activities: usize,
    pub activities: Vec<PlannedActivity>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    /// Destination passed the pre-flight gate cleanly.
    Full,
    /// Between the reject and proceed thresholds; plan shipped with a warning.
    Limited,
}

/// Output of one planning run, ready for the persistence layer.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ItineraryPlan {
    pub destination: String,
    pub total_days: u32,
    pub dates: Option<String>,
    pub data_quality: DataQuality,
    pub days: Vec<DayPlan>,
    pub notes: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        duration: Option<u32>,
    ) -> PlanRequest {
        PlanRequest {
            destination: "Lisbon, Portugal".to_string(),
            trip_type: TripType::Solo,
            start_date: start,
            end_date: end,
            duration_days: duration,
            preferences: Vec::new(),
            notes: None,
        }
    }

    #[test]
    fn trip_days_from_date_range_is_inclusive() {
        let req = request_with(
            NaiveDate::from_ymd_opt(2025, 3, 15),
            NaiveDate::from_ymd_opt(2025, 3, 17),
            None,
        );
        assert_eq!(req.trip_days().unwrap(), 3);
    }

    #[test]
    fn trip_days_falls_back_to_duration() {
        let req = request_with(None, None, Some(5));
        assert_eq!(req.trip_days().unwrap(), 5);
    }

    #[test]
    fn trip_days_rejects_missing_length() {
        assert!(request_with(None, None, None).trip_days().is_err());
    }

    #[test]
    fn trip_days_rejects_inverted_range() {
        let req = request_with(
            NaiveDate::from_ymd_opt(2025, 3, 17),
            NaiveDate::from_ymd_opt(2025, 3, 15),
            None,
        );
        assert!(req.trip_days().is_err());
    }

    #[test]
    fn trip_days_rejects_zero_and_oversized() {
        assert!(request_with(None, None, Some(0)).trip_days().is_err());
        assert!(request_with(None, None, Some(31)).trip_days().is_err());
    }
}

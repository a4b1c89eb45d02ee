use thiserror::Error;

/// How a candidate shortfall looked when the pool came up short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortfallKind {
    /// The destination returned essentially nothing.
    NoVenues,
    /// Venues exist but too few for the requested trip.
    Sparse,
    /// Enough raw venues, but most are missing photos or other quality signals.
    LowQuality,
}

impl ShortfallKind {
    fn describe(&self) -> &'static str {
        match self {
            ShortfallKind::NoVenues => "no usable venues were found",
            ShortfallKind::Sparse => "only a handful of venues were found",
            ShortfallKind::LowQuality => {
                "venues were found but most lack photos or quality data"
            }
        }
    }
}

/// Abortable planning failures. Partial-data degradation is never an error;
/// it is logged and absorbed by the pipeline's neutral defaults.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error(
        "{destination} does not have enough tourism data to plan a trip \
         (pre-flight search found {venue_count} venues)"
    )]
    InfeasibleDestination {
        destination: String,
        venue_count: usize,
    },

    #[error(
        "could not build a {requested_days}-day itinerary for {destination}: \
         {} ({found} candidates, {required} required)", kind.describe()
    )]
    InsufficientCandidates {
        destination: String,
        requested_days: u32,
        found: usize,
        required: usize,
        kind: ShortfallKind,
    },

    #[error("invalid plan request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_candidates_message_carries_context() {
        let err = PlanError::InsufficientCandidates {
            destination: "Svalbard".to_string(),
            requested_days: 4,
            found: 3,
            required: 12,
            kind: ShortfallKind::Sparse,
        };
        let msg = err.to_string();
        assert!(msg.contains("Svalbard"));
        assert!(msg.contains("4-day"));
        assert!(msg.contains("3 candidates"));
        assert!(msg.contains("12 required"));
    }

    #[test]
    fn infeasible_message_names_destination_and_count() {
        let err = PlanError::InfeasibleDestination {
            destination: "Middle of Nowhere".to_string(),
            venue_count: 5,
        };
        let msg = err.to_string();
        assert!(msg.contains("Middle of Nowhere"));
        assert!(msg.contains("5 venues"));
    }
}

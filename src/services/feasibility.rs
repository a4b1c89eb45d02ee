//! Pre-flight destination feasibility gate.
//!
//! Runs once per planning invocation on a broad, type-unfiltered search
//! before the expensive candidate pool build.

use serde::{Deserialize, Serialize};

pub const PREFLIGHT_QUERY: &str = "things to do";
pub const PREFLIGHT_RADIUS_M: u32 = 20_000;
pub const PREFLIGHT_MAX_PAGES: u32 = 3;

const DEFAULT_REJECT_BELOW: usize = 10;
const DEFAULT_WARN_BELOW: usize = 30;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Feasibility {
    /// Too little data; planning must stop.
    Reject,
    /// Plannable, but quality may be degraded.
    ProceedWithWarning,
    Proceed,
}

#[derive(Debug, Clone)]
pub struct FeasibilityConfig {
    pub reject_below: usize,
    pub warn_below: usize,
}

impl Default for FeasibilityConfig {
    fn default() -> Self {
        Self {
            reject_below: DEFAULT_REJECT_BELOW,
            warn_below: DEFAULT_WARN_BELOW,
        }
    }
}

impl FeasibilityConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            reject_below: std::env::var("PLAN_FEASIBILITY_REJECT_BELOW")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.reject_below),
            warn_below: std::env::var("PLAN_FEASIBILITY_WARN_BELOW")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.warn_below),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct FeasibilityGate {
    config: FeasibilityConfig,
}

impl FeasibilityGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FeasibilityConfig) -> Self {
        Self { config }
    }

    /// Classify a pre-flight venue count. Monotone in the count: more venues
    /// never produce a stricter outcome.
    pub fn assess(&self, venue_count: usize) -> Feasibility {
        if venue_count < self.config.reject_below {
            Feasibility::Reject
        } else if venue_count < self.config.warn_below {
            Feasibility::ProceedWithWarning
        } else {
            Feasibility::Proceed
        }
    }
}

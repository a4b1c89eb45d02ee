use serde::{Deserialize, Serialize};

pub const SLIDER_MIDPOINT: u8 = 50;

/// A stored preference document as travelers submit it. Every field is
/// optional; validation and defaulting happen once, in the aggregator.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PreferenceDocument {
    pub budget_style: Option<u8>,
    pub pace_style: Option<u8>,
    pub schedule_style: Option<u8>,
    #[serde(default)]
    pub selected_interests: Vec<String>,
    pub other_interests: Option<String>,
}

/// The merged preference profile one planning run works against.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PreferenceProfile {
    /// 0 = budget, 100 = luxury.
    pub budget_style: u8,
    /// 0 = relaxation, 100 = adventure.
    pub pace_style: u8,
    /// 0 = early bird, 100 = night owl.
    pub schedule_style: u8,
    pub selected_interests: Vec<String>,
    /// Free-text interest notes collected across travelers.
    pub other_interests: Vec<String>,
    pub participant_count: usize,
}

impl Default for PreferenceProfile {
    fn default() -> Self {
        Self {
            budget_style: SLIDER_MIDPOINT,
            pace_style: SLIDER_MIDPOINT,
            schedule_style: SLIDER_MIDPOINT,
            selected_interests: Vec::new(),
            other_interests: Vec::new(),
            participant_count: 0,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaceTier {
    Relaxed,
    Moderate,
    Energetic,
}

impl PaceTier {
    pub fn from_style(pace_style: u8) -> Self {
        if pace_style <= 33 {
            PaceTier::Relaxed
        } else if pace_style <= 66 {
            PaceTier::Moderate
        } else {
            PaceTier::Energetic
        }
    }

    /// Baseline (min, max) activities for a full middle day at this pace.
    pub fn base_daily_activities(&self) -> (usize, usize) {
        match self {
            PaceTier::Relaxed => (2, 3),
            PaceTier::Moderate => (3, 4),
            PaceTier::Energetic => (4, 6),
        }
    }
}

impl PreferenceProfile {
    pub fn pace_tier(&self) -> PaceTier {
        PaceTier::from_style(self.pace_style)
    }

    /// Two adjacent price tiers (out of 1-4) sliding with the budget dial.
    pub fn target_price_levels(&self) -> [u8; 2] {
        if self.budget_style <= 33 {
            [1, 2]
        } else if self.budget_style <= 66 {
            [2, 3]
        } else {
            [3, 4]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pace_tier_boundaries() {
        assert_eq!(PaceTier::from_style(0), PaceTier::Relaxed);
        assert_eq!(PaceTier::from_style(33), PaceTier::Relaxed);
        assert_eq!(PaceTier::from_style(34), PaceTier::Moderate);
        assert_eq!(PaceTier::from_style(66), PaceTier::Moderate);
        assert_eq!(PaceTier::from_style(67), PaceTier::Energetic);
        assert_eq!(PaceTier::from_style(100), PaceTier::Energetic);
    }

    #[test]
    fn price_levels_slide_with_budget() {
        let mut profile = PreferenceProfile::default();
        profile.budget_style = 10;
        assert_eq!(profile.target_price_levels(), [1, 2]);
        profile.budget_style = 50;
        assert_eq!(profile.target_price_levels(), [2, 3]);
        profile.budget_style = 90;
        assert_eq!(profile.target_price_levels(), [3, 4]);
    }
}

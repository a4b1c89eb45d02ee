//! Merges per-traveler preference documents into one profile for the run.

use std::collections::BTreeSet;

use crate::models::preferences::{PreferenceDocument, PreferenceProfile, SLIDER_MIDPOINT};

/// Aggregate one or more preference documents. Numeric sliders take the
/// median across travelers, interest tags the union. No documents yields the
/// all-midpoint default profile.
pub fn aggregate_preferences(documents: &[PreferenceDocument]) -> PreferenceProfile {
    if documents.is_empty() {
        return PreferenceProfile::default();
    }

    let budget = median_or_default(documents.iter().filter_map(|d| d.budget_style));
    let pace = median_or_default(documents.iter().filter_map(|d| d.pace_style));
    let schedule = median_or_default(documents.iter().filter_map(|d| d.schedule_style));

    let interests: BTreeSet<String> = documents
        .iter()
        .flat_map(|d| d.selected_interests.iter().cloned())
        .collect();

    let other_interests: Vec<String> = documents
        .iter()
        .filter_map(|d| d.other_interests.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    PreferenceProfile {
        budget_style: budget,
        pace_style: pace,
        schedule_style: schedule,
        selected_interests: interests.into_iter().collect(),
        other_interests,
        participant_count: documents.len(),
    }
}

fn median_or_default(values: impl Iterator<Item = u8>) -> u8 {
    let mut sorted: Vec<u8> = values.collect();
    if sorted.is_empty() {
        return SLIDER_MIDPOINT;
    }
    sorted.sort_unstable();

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        sorted[mid]
    } else {
        ((sorted[mid - 1] as u16 + sorted[mid] as u16) / 2) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(budget: u8, pace: u8, interests: &[&str]) -> PreferenceDocument {
        PreferenceDocument {
            budget_style: Some(budget),
            pace_style: Some(pace),
            schedule_style: None,
            selected_interests: interests.iter().map(|s| s.to_string()).collect(),
            other_interests: None,
        }
    }

    #[test]
    fn no_documents_yields_midpoint_defaults() {
        let profile = aggregate_preferences(&[]);
        assert_eq!(profile.budget_style, 50);
        assert_eq!(profile.pace_style, 50);
        assert_eq!(profile.schedule_style, 50);
        assert!(profile.selected_interests.is_empty());
        assert_eq!(profile.participant_count, 0);
    }

    #[test]
    fn single_document_passes_through_with_defaults_for_missing() {
        let profile = aggregate_preferences(&[doc(80, 20, &["Museums"])]);
        assert_eq!(profile.budget_style, 80);
        assert_eq!(profile.pace_style, 20);
        // schedule_style was absent in the document.
        assert_eq!(profile.schedule_style, 50);
        assert_eq!(profile.selected_interests, vec!["Museums".to_string()]);
        assert_eq!(profile.participant_count, 1);
    }

    #[test]
    fn sliders_take_the_median() {
        let docs = vec![doc(10, 90, &[]), doc(50, 10, &[]), doc(90, 20, &[])];
        let profile = aggregate_preferences(&docs);
        assert_eq!(profile.budget_style, 50);
        assert_eq!(profile.pace_style, 20);
    }

    #[test]
    fn even_count_averages_the_middle_pair() {
        let docs = vec![doc(20, 0, &[]), doc(60, 0, &[])];
        let profile = aggregate_preferences(&docs);
        assert_eq!(profile.budget_style, 40);
    }

    #[test]
    fn interests_are_unioned_and_sorted() {
        let docs = vec![
            doc(50, 50, &["Museums", "Hiking"]),
            doc(50, 50, &["Hiking", "Clubs"]),
        ];
        let profile = aggregate_preferences(&docs);
        assert_eq!(
            profile.selected_interests,
            vec!["Clubs".to_string(), "Hiking".to_string(), "Museums".to_string()]
        );
    }

    #[test]
    fn blank_other_interests_are_dropped() {
        let mut a = doc(50, 50, &[]);
        a.other_interests = Some("  rooftop views ".to_string());
        let mut b = doc(50, 50, &[]);
        b.other_interests = Some("   ".to_string());

        let profile = aggregate_preferences(&[a, b]);
        assert_eq!(profile.other_interests, vec!["rooftop views".to_string()]);
    }
}

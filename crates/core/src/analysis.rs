//! Progress analysis: classify a user's mission data into a motivation
//! profile.
//!
//! Pure functions, no I/O. Thresholds are checked high-to-low; the first
//! matching branch wins.

use crate::types::{
    DailyProgress, EngagementLevel, MissionState, MotivationProfile, MotivationType,
    ProgressPattern, UrgencyLevel,
};

/// Analyze one user's mission progress into a [`MotivationProfile`].
///
/// With an empty mission list the completion rate is `0.0` (no division).
pub fn analyze_mission_progress(
    user_id: &str,
    missions: &[MissionState],
    daily: &DailyProgress,
) -> MotivationProfile {
    let total_count = missions.len() as u32;
    let completed_count = missions.iter().filter(|m| m.completed).count() as u32;
    let completion_rate = if total_count == 0 {
        0.0
    } else {
        f64::from(completed_count) / f64::from(total_count)
    };

    let failure_points: Vec<String> = missions
        .iter()
        .filter(|m| !m.completed)
        .map(|m| m.mission_id.clone())
        .collect();

    let progress_pattern = progress_pattern(daily);
    let motivation_type = motivation_type(completion_rate, progress_pattern);
    let urgency_level = urgency_level(completion_rate, failure_points.len());
    let engagement_level = engagement_level(daily);

    tracing::debug!(
        user_id,
        completion_rate,
        ?motivation_type,
        ?urgency_level,
        "analyzed mission progress"
    );

    MotivationProfile {
        user_id: user_id.to_string(),
        completion_rate,
        completed_count,
        total_count,
        failure_points,
        progress_pattern,
        motivation_type,
        urgency_level,
        engagement_level,
        streak_days: daily.current_streak,
        weekly_completion_rate: daily.weekly_completion_rate,
    }
}

/// Classify the behavioral pattern. A streak of 7+ days wins regardless of
/// the weekly rate.
fn progress_pattern(daily: &DailyProgress) -> ProgressPattern {
    if daily.current_streak >= 7 {
        ProgressPattern::ConsistentHighPerformer
    } else if daily.current_streak >= 3 {
        ProgressPattern::SteadyImprover
    } else if daily.weekly_completion_rate >= 0.7 {
        ProgressPattern::WeekendWarrior
    } else {
        ProgressPattern::NeedsSupport
    }
}

fn motivation_type(completion_rate: f64, pattern: ProgressPattern) -> MotivationType {
    if completion_rate >= 0.8 {
        MotivationType::Achievement
    } else if completion_rate >= 0.5 {
        MotivationType::HabitFormation
    } else if pattern == ProgressPattern::WeekendWarrior {
        MotivationType::Social
    } else {
        MotivationType::HealthBenefit
    }
}

fn urgency_level(completion_rate: f64, failure_count: usize) -> UrgencyLevel {
    if completion_rate < 0.3 || failure_count >= 3 {
        UrgencyLevel::High
    } else if completion_rate < 0.6 || failure_count >= 2 {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    }
}

fn engagement_level(daily: &DailyProgress) -> EngagementLevel {
    if daily.weekly_completion_rate >= 0.8 {
        EngagementLevel::High
    } else if daily.weekly_completion_rate >= 0.5 {
        EngagementLevel::Medium
    } else {
        EngagementLevel::Low
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn daily(streak: u32, weekly: f64) -> DailyProgress {
        DailyProgress {
            current_streak: streak,
            weekly_completion_rate: weekly,
            today_completed_count: 0,
            today_total_count: 0,
        }
    }

    fn missions(completed: usize, failed: usize) -> Vec<MissionState> {
        let mut out = Vec::new();
        for i in 0..completed {
            out.push(MissionState {
                mission_id: format!("done_{i}"),
                completed: true,
            });
        }
        for i in 0..failed {
            out.push(MissionState {
                mission_id: format!("miss_{i}"),
                completed: false,
            });
        }
        out
    }

    // -- progress pattern -----------------------------------------------------

    #[test]
    fn long_streak_wins_regardless_of_weekly_rate() {
        for weekly in [0.0, 0.3, 0.69, 0.7, 1.0] {
            let profile = analyze_mission_progress("u1", &missions(1, 0), &daily(7, weekly));
            assert_eq!(
                profile.progress_pattern,
                ProgressPattern::ConsistentHighPerformer
            );
        }
    }

    #[test]
    fn medium_streak_is_steady_improver() {
        let profile = analyze_mission_progress("u1", &missions(1, 0), &daily(3, 0.9));
        assert_eq!(profile.progress_pattern, ProgressPattern::SteadyImprover);
    }

    #[test]
    fn short_streak_high_weekly_is_weekend_warrior() {
        let profile = analyze_mission_progress("u1", &missions(1, 0), &daily(2, 0.7));
        assert_eq!(profile.progress_pattern, ProgressPattern::WeekendWarrior);
    }

    #[test]
    fn short_streak_low_weekly_needs_support() {
        let profile = analyze_mission_progress("u1", &missions(1, 0), &daily(0, 0.4));
        assert_eq!(profile.progress_pattern, ProgressPattern::NeedsSupport);
    }

    // -- completion rate & failure points -------------------------------------

    #[test]
    fn empty_mission_list_has_zero_rate() {
        let profile = analyze_mission_progress("u1", &[], &daily(0, 0.0));
        assert_eq!(profile.completion_rate, 0.0);
        assert_eq!(profile.total_count, 0);
        assert!(profile.failure_points.is_empty());
    }

    #[test]
    fn failure_points_plus_completed_equals_total() {
        let profile = analyze_mission_progress("u1", &missions(3, 2), &daily(0, 0.0));
        assert_eq!(
            profile.failure_points.len() as u32 + profile.completed_count,
            profile.total_count
        );
    }

    #[test]
    fn failure_points_preserve_input_order() {
        let input = vec![
            MissionState {
                mission_id: "m1".into(),
                completed: false,
            },
            MissionState {
                mission_id: "m2".into(),
                completed: true,
            },
            MissionState {
                mission_id: "m3".into(),
                completed: false,
            },
        ];
        let profile = analyze_mission_progress("u1", &input, &daily(0, 0.0));
        assert_eq!(profile.failure_points, vec!["m1", "m3"]);
    }

    #[test]
    fn completion_rate_always_in_unit_interval() {
        for (c, f) in [(0, 0), (0, 4), (4, 0), (2, 3)] {
            let profile = analyze_mission_progress("u1", &missions(c, f), &daily(0, 0.0));
            assert!((0.0..=1.0).contains(&profile.completion_rate));
        }
    }

    // -- motivation type ------------------------------------------------------

    #[test]
    fn high_rate_is_achievement() {
        let profile = analyze_mission_progress("u1", &missions(4, 1), &daily(0, 0.0));
        assert_eq!(profile.motivation_type, MotivationType::Achievement);
    }

    #[test]
    fn middling_rate_is_habit_formation() {
        let profile = analyze_mission_progress("u1", &missions(3, 3), &daily(0, 0.0));
        assert_eq!(profile.motivation_type, MotivationType::HabitFormation);
    }

    #[test]
    fn low_rate_weekend_warrior_is_social() {
        let profile = analyze_mission_progress("u1", &missions(1, 4), &daily(0, 0.8));
        assert_eq!(profile.motivation_type, MotivationType::Social);
    }

    #[test]
    fn low_rate_otherwise_is_health_benefit() {
        let profile = analyze_mission_progress("u1", &missions(1, 4), &daily(0, 0.2));
        assert_eq!(profile.motivation_type, MotivationType::HealthBenefit);
    }

    // -- urgency --------------------------------------------------------------

    #[test]
    fn low_rate_or_many_failures_is_high_urgency() {
        // rate 0.25 < 0.3
        let profile = analyze_mission_progress("u1", &missions(1, 3), &daily(0, 0.0));
        assert_eq!(profile.urgency_level, UrgencyLevel::High);

        // rate 0.5 but 3 failure points
        let profile = analyze_mission_progress("u1", &missions(3, 3), &daily(0, 0.0));
        assert_eq!(profile.urgency_level, UrgencyLevel::High);
    }

    #[test]
    fn two_failures_is_medium_urgency() {
        // rate 0.6, 2 failure points
        let profile = analyze_mission_progress("u1", &missions(3, 2), &daily(0, 0.0));
        assert_eq!(profile.urgency_level, UrgencyLevel::Medium);
    }

    #[test]
    fn near_complete_is_low_urgency() {
        let profile = analyze_mission_progress("u1", &missions(5, 1), &daily(0, 0.0));
        assert_eq!(profile.urgency_level, UrgencyLevel::Low);
    }

    // -- worked example from the product rules --------------------------------

    #[test]
    fn high_performer_example() {
        // rate 0.9, streak 1, weekly 0.9
        let profile = analyze_mission_progress("u1", &missions(9, 1), &daily(1, 0.9));
        assert_eq!(profile.motivation_type, MotivationType::Achievement);
        assert_eq!(profile.urgency_level, UrgencyLevel::Low);
        assert_eq!(profile.engagement_level, EngagementLevel::High);
    }

    #[test]
    fn engagement_bands() {
        let high = analyze_mission_progress("u1", &missions(1, 0), &daily(0, 0.8));
        assert_eq!(high.engagement_level, EngagementLevel::High);
        let medium = analyze_mission_progress("u1", &missions(1, 0), &daily(0, 0.5));
        assert_eq!(medium.engagement_level, EngagementLevel::Medium);
        let low = analyze_mission_progress("u1", &missions(1, 0), &daily(0, 0.49));
        assert_eq!(low.engagement_level, EngagementLevel::Low);
    }
}

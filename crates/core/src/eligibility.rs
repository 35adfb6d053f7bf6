//! Eligibility filtering for batch notification runs.
//!
//! A user qualifies when their performance warrants a nudge and the local
//! wall clock is outside quiet hours.

use std::collections::HashSet;

use chrono::NaiveTime;

use crate::types::UserMissionSnapshot;

/// Completion-rate threshold below which a user needs a nudge.
const LOW_COMPLETION_THRESHOLD: f64 = 0.6;

/// Consecutive-failure count at which a user needs a nudge.
const FAILURE_STREAK_THRESHOLD: u32 = 2;

/// Derive a consecutive-failure count from the completion rate.
///
/// Fixed banding standing in for a real historical-streak query; callers
/// needing exact streak semantics must supply richer data.
pub fn consecutive_failures(completion_rate: f64) -> u32 {
    if completion_rate < 0.3 {
        3
    } else if completion_rate < 0.5 {
        2
    } else if completion_rate < 0.7 {
        1
    } else {
        0
    }
}

/// Whether `now` falls in quiet hours: `[22:00, 08:00)`, wrapping midnight.
pub fn is_quiet_hours(now: NaiveTime) -> bool {
    let start = NaiveTime::from_hms_opt(22, 0, 0).expect("valid time");
    let end = NaiveTime::from_hms_opt(8, 0, 0).expect("valid time");
    now >= start || now < end
}

/// Select the users who should receive a notification right now.
///
/// A user is eligible iff their completion rate is below 0.6 or their
/// consecutive-failure count is at least 2, the local time is outside quiet
/// hours, and (when `target_users` is non-empty) they are in the target set.
pub fn filter_users_needing_notification(
    snapshots: Vec<UserMissionSnapshot>,
    now: NaiveTime,
    target_users: &HashSet<String>,
) -> Vec<UserMissionSnapshot> {
    if is_quiet_hours(now) {
        tracing::info!(%now, "quiet hours, no users eligible");
        return Vec::new();
    }

    snapshots
        .into_iter()
        .filter(|snap| {
            let rate = snap.completion_rate();
            rate < LOW_COMPLETION_THRESHOLD
                || consecutive_failures(rate) >= FAILURE_STREAK_THRESHOLD
        })
        .filter(|snap| target_users.is_empty() || target_users.contains(&snap.user_id))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

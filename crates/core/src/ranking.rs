//! Urgency scoring and ranking for batch runs.

use chrono::{DateTime, Utc};

use crate::eligibility::consecutive_failures;
use crate::types::UserMissionSnapshot;

/// Cap on the inactivity contribution to the urgency score.
const MAX_INACTIVITY_SCORE: i64 = 30;

/// Compute the urgency score for one user.
///
/// `score = round((1 - rate) * 50) + failures * 20 + min(days_inactive * 5, 30)`.
/// Higher means more urgent. Decreasing the completion rate never decreases
/// the score.
pub fn urgency_score(snapshot: &UserMissionSnapshot, now: DateTime<Utc>) -> i64 {
    let rate = snapshot.completion_rate();
    let mut score = ((1.0 - rate) * 50.0).round() as i64;
    score += i64::from(consecutive_failures(rate)) * 20;

    let days_inactive = (now - snapshot.last_active_time).num_days().max(0);
    score += (days_inactive * 5).min(MAX_INACTIVITY_SCORE);

    score
}

/// Order users by descending urgency score, ties broken by ascending
/// `last_active_time` (stalest first). The sort is stable, so equal-score,
/// equal-timestamp inputs retain their relative order.
pub fn prioritize_by_urgency(
    mut snapshots: Vec<UserMissionSnapshot>,
    now: DateTime<Utc>,
) -> Vec<UserMissionSnapshot> {
    snapshots.sort_by_key(|snap| (std::cmp::Reverse(urgency_score(snap, now)), snap.last_active_time));
    snapshots
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

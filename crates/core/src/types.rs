//! Data shapes shared across the motivation engine.
//!
//! Classification enums are closed: adding a category fails to compile until
//! every `match` over it is updated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// A user's mission completion summary, as reported by the goal service.
///
/// Read-only input to the batch path. `completed_missions` never exceeds
/// `total_missions` at the source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserMissionSnapshot {
    pub user_id: String,
    pub total_missions: u32,
    pub completed_missions: u32,
    pub last_active_time: DateTime<Utc>,
}

impl UserMissionSnapshot {
    /// Fraction of missions completed, `0.0` when the user has no missions.
    pub fn completion_rate(&self) -> f64 {
        if self.total_missions == 0 {
            0.0
        } else {
            f64::from(self.completed_missions) / f64::from(self.total_missions)
        }
    }
}

/// Completion state of a single mission, supplied by the caller on the
/// on-demand path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionState {
    pub mission_id: String,
    pub completed: bool,
}

/// Daily progress figures for one user, fetched from the goal service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyProgress {
    /// Consecutive days with all missions completed.
    pub current_streak: u32,
    /// Completion rate over the trailing week, `0.0..=1.0`.
    pub weekly_completion_rate: f64,
    pub today_completed_count: u32,
    pub today_total_count: u32,
}

// ---------------------------------------------------------------------------
// Classification enums
// ---------------------------------------------------------------------------

/// Broad behavioral pattern derived from streak and weekly rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPattern {
    ConsistentHighPerformer,
    SteadyImprover,
    WeekendWarrior,
    NeedsSupport,
}

/// Psychological framing chosen for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MotivationType {
    Achievement,
    HabitFormation,
    Social,
    HealthBenefit,
}

/// How urgently the user needs a nudge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UrgencyLevel {
    Low,
    Medium,
    High,
}

/// How engaged the user has been over the trailing week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EngagementLevel {
    Low,
    Medium,
    High,
}

/// When the composed message should be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuggestedTiming {
    #[serde(rename = "immediate")]
    Immediate,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "next_morning")]
    NextMorning,
}

// ---------------------------------------------------------------------------
// Derived shapes
// ---------------------------------------------------------------------------

/// Full motivation profile for one user. Immutable once computed; recomputed
/// per request, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotivationProfile {
    pub user_id: String,
    pub completion_rate: f64,
    pub completed_count: u32,
    pub total_count: u32,
    /// Identifiers of incomplete missions, in input order.
    pub failure_points: Vec<String>,
    pub progress_pattern: ProgressPattern,
    pub motivation_type: MotivationType,
    pub urgency_level: UrgencyLevel,
    pub engagement_level: EngagementLevel,
    pub streak_days: u32,
    pub weekly_completion_rate: f64,
}

/// Batch-path projection of a user's state, fed to the batch composer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationContext {
    pub user_id: String,
    pub completion_rate: f64,
    pub consecutive_failures: u32,
    pub last_active_time: DateTime<Utc>,
    pub total_missions: u32,
    pub completed_missions: u32,
}

// ---------------------------------------------------------------------------
// Outputs
// ---------------------------------------------------------------------------

/// Personalized encouragement produced by the on-demand path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncouragementMessage {
    /// Message text, at most 100 chars after trimming.
    pub message: String,
    pub motivation_type: MotivationType,
    pub suggested_timing: SuggestedTiming,
    pub personalized_tip: String,
    pub priority: UrgencyLevel,
}

/// Report of one bulk notification run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRunResult {
    pub batch_id: String,
    pub processed_count: u32,
    pub success_count: u32,
    pub failed_count: u32,
}

/// A notification log entry to append. The row is immutable once written,
/// except for response-tracking columns filled in later by collaborators.
#[derive(Debug, Clone)]
pub struct NewNotificationRecord {
    pub user_id: String,
    pub mission_id: Option<String>,
    pub notification_type: String,
    pub message: String,
    pub batch_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

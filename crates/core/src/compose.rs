//! Message composition: prompt building, AI delegation, and deterministic
//! fallbacks.
//!
//! The composer is the terminal error boundary for text generation: any
//! failure from the [`TextGeneration`] port degrades to a canned,
//! enum-keyed message. Composition itself never fails.

use std::sync::Arc;

use crate::ports::TextGeneration;
use crate::types::{MotivationProfile, MotivationType, NotificationContext};

/// Length budget (chars) for on-demand encouragement messages.
pub const ON_DEMAND_MESSAGE_BUDGET: usize = 100;

/// Length budget (chars) for batch messages.
pub const BATCH_MESSAGE_BUDGET: usize = 80;

/// Composes encouragement text, delegating to a text-generation capability
/// with deterministic offline fallbacks.
#[derive(Clone)]
pub struct MessageComposer {
    textgen: Arc<dyn TextGeneration>,
}

impl MessageComposer {
    pub fn new(textgen: Arc<dyn TextGeneration>) -> Self {
        Self { textgen }
    }

    /// Compose a personalized encouragement message for the on-demand path.
    ///
    /// Falls back to [`fallback_message`] on any generation failure.
    pub async fn compose(&self, profile: &MotivationProfile) -> String {
        let prompt = build_encouragement_prompt(profile);
        match self.textgen.generate(&prompt).await {
            Ok(text) => normalize_and_truncate(&text, ON_DEMAND_MESSAGE_BUDGET),
            Err(err) => {
                tracing::warn!(
                    user_id = %profile.user_id,
                    error = %err,
                    "text generation failed, using fallback message"
                );
                fallback_message(profile)
            }
        }
    }

    /// Compose a short nudge for the batch path.
    ///
    /// Falls back to [`batch_fallback_message`] on any generation failure.
    pub async fn compose_batch(&self, context: &NotificationContext) -> String {
        let prompt = build_batch_prompt(context);
        match self.textgen.generate(&prompt).await {
            Ok(text) => normalize_and_truncate(&text, BATCH_MESSAGE_BUDGET),
            Err(err) => {
                tracing::warn!(
                    user_id = %context.user_id,
                    error = %err,
                    "batch text generation failed, using fallback message"
                );
                batch_fallback_message(context)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Prompt building
// ---------------------------------------------------------------------------

/// Build the on-demand coaching prompt. Deterministic given the profile.
fn build_encouragement_prompt(profile: &MotivationProfile) -> String {
    let failed = if profile.failure_points.is_empty() {
        "none".to_string()
    } else {
        profile.failure_points.join(", ")
    };

    format!(
        "You are a friendly, warm health coach. Write a personalized \
         encouragement message based on the following.\n\
         \n\
         [User progress]\n\
         - Completion rate: {:.1}% ({}/{} missions done)\n\
         - Current streak: {} days\n\
         - Motivation type: {:?}\n\
         - Urgency: {:?}\n\
         - Weekly completion rate: {:.1}%\n\
         \n\
         [Missed missions]\n\
         {}\n\
         \n\
         [Requirements]\n\
         - At most 100 characters\n\
         - {} framing\n\
         - Include one concrete action suggestion\n\
         - Positive, encouraging tone\n\
         - Use an emoji for warmth",
        profile.completion_rate * 100.0,
        profile.completed_count,
        profile.total_count,
        profile.streak_days,
        profile.motivation_type,
        profile.urgency_level,
        profile.weekly_completion_rate * 100.0,
        failed,
        motivation_style(profile.motivation_type),
    )
}

/// Build the batch nudge prompt. Deterministic given the context.
fn build_batch_prompt(context: &NotificationContext) -> String {
    format!(
        "As a health coach, write a warm check-in message for this user.\n\
         \n\
         [Situation]\n\
         - Completion rate: {:.1}%\n\
         - Consecutive failures: {} days\n\
         - Last active: {}\n\
         \n\
         [Requirements]\n\
         - At most 80 characters\n\
         - Gentle, encouraging tone, never guilt-tripping\n\
         - A hopeful note that today is a fresh start\n\
         - Use an emoji for warmth",
        context.completion_rate * 100.0,
        context.consecutive_failures,
        context.last_active_time.date_naive(),
    )
}

/// Tone descriptor injected into the prompt for each motivation type.
fn motivation_style(motivation_type: MotivationType) -> &'static str {
    match motivation_type {
        MotivationType::Achievement => "achievement-focused",
        MotivationType::HabitFormation => "habit-building",
        MotivationType::Social => "social-connection",
        MotivationType::HealthBenefit => "health-benefit",
    }
}

// ---------------------------------------------------------------------------
// Post-processing
// ---------------------------------------------------------------------------

/// Collapse newlines and runs of whitespace to single spaces, then hard-cap
/// at `budget` chars, appending an ellipsis when cut. Char-based so multibyte
/// text is never split mid-character.
pub fn normalize_and_truncate(text: &str, budget: usize) -> String {
    let cleaned: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() <= budget {
        return cleaned;
    }
    let cut: String = cleaned.chars().take(budget - 3).collect();
    format!("{cut}...")
}

// ---------------------------------------------------------------------------
// Fallbacks
// ---------------------------------------------------------------------------

/// Deterministic on-demand fallback, keyed by motivation type.
pub fn fallback_message(profile: &MotivationProfile) -> String {
    match profile.motivation_type {
        MotivationType::Achievement => format!(
            "\u{1F3AF} {:.0}% done! Your goal is within reach, keep pushing!",
            profile.completion_rate * 100.0
        ),
        MotivationType::HabitFormation => format!(
            "\u{1F4AA} {} days in a row! Keep going, the habit is forming!",
            profile.streak_days
        ),
        MotivationType::Social => {
            "\u{1F465} You can go further together! Make today another healthy day!".to_string()
        }
        MotivationType::HealthBenefit => {
            "\u{1F31F} Healthy change starts with small steps. One more step today!".to_string()
        }
    }
}

/// Deterministic batch fallback, keyed by failure streak and completion rate.
pub fn batch_fallback_message(context: &NotificationContext) -> String {
    if context.consecutive_failures >= 3 {
        "\u{1F305} A new day, a fresh start! Begin again with one small step!".to_string()
    } else if context.completion_rate < 0.5 {
        "\u{1F4AA} Don't give up! Start rebuilding your healthy habits today!".to_string()
    } else {
        "\u{1F3AF} Almost there! Just a little more to reach your health goal!".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use crate::types::{EngagementLevel, ProgressPattern, UrgencyLevel};
    use async_trait::async_trait;
    use chrono::Utc;

    struct FixedGen(String);

    #[async_trait]
    impl TextGeneration for FixedGen {
        async fn generate(&self, _prompt: &str) -> Result<String, CoreError> {
            Ok(self.0.clone())
        }
    }

    struct FailingGen;

    #[async_trait]
    impl TextGeneration for FailingGen {
        async fn generate(&self, _prompt: &str) -> Result<String, CoreError> {
            Err(CoreError::Generation("model offline".into()))
        }
    }

    fn profile(motivation_type: MotivationType) -> MotivationProfile {
        MotivationProfile {
            user_id: "u1".into(),
            completion_rate: 0.4,
            completed_count: 2,
            total_count: 5,
            failure_points: vec!["m1".into()],
            progress_pattern: ProgressPattern::NeedsSupport,
            motivation_type,
            urgency_level: UrgencyLevel::Medium,
            engagement_level: EngagementLevel::Low,
            streak_days: 2,
            weekly_completion_rate: 0.3,
        }
    }

    fn context(rate: f64, failures: u32) -> NotificationContext {
        NotificationContext {
            user_id: "u1".into(),
            completion_rate: rate,
            consecutive_failures: failures,
            last_active_time: Utc::now(),
            total_missions: 5,
            completed_missions: 2,
        }
    }

    // -- normalization / truncation -------------------------------------------

    #[test]
    fn collapses_newlines_and_space_runs() {
        assert_eq!(
            normalize_and_truncate("hello\n\nworld   again\t!", 100),
            "hello world again !"
        );
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(normalize_and_truncate("keep going", 100), "keep going");
    }

    #[test]
    fn long_text_is_cut_with_ellipsis() {
        let long = "x".repeat(150);
        let out = normalize_and_truncate(&long, 100);
        assert_eq!(out.chars().count(), 100);
        assert!(out.ends_with("..."));
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        // Each emoji is one char but four bytes; must not panic or split.
        let long: String = "\u{1F31F}".repeat(90);
        let out = normalize_and_truncate(&long, 80);
        assert_eq!(out.chars().count(), 80);
        assert!(out.ends_with("..."));
    }

    // -- fallbacks ------------------------------------------------------------

    #[test]
    fn fallback_messages_fit_on_demand_budget() {
        for mt in [
            MotivationType::Achievement,
            MotivationType::HabitFormation,
            MotivationType::Social,
            MotivationType::HealthBenefit,
        ] {
            let msg = fallback_message(&profile(mt));
            assert!(!msg.is_empty());
            assert!(msg.chars().count() <= ON_DEMAND_MESSAGE_BUDGET);
        }
    }

    #[test]
    fn batch_fallbacks_fit_batch_budget() {
        for ctx in [context(0.1, 3), context(0.4, 1), context(0.8, 0)] {
            let msg = batch_fallback_message(&ctx);
            assert!(!msg.is_empty());
            assert!(msg.chars().count() <= BATCH_MESSAGE_BUDGET);
        }
    }

    #[test]
    fn batch_fallback_selection() {
        // 3+ failures wins over completion rate.
        let restart = batch_fallback_message(&context(0.9, 3));
        assert!(restart.contains("fresh start"));

        let dont_give_up = batch_fallback_message(&context(0.3, 1));
        assert!(dont_give_up.contains("give up"));

        let almost = batch_fallback_message(&context(0.8, 0));
        assert!(almost.contains("Almost there"));
    }

    // -- composer -------------------------------------------------------------

    #[tokio::test]
    async fn compose_uses_generated_text() {
        let composer = MessageComposer::new(Arc::new(FixedGen("You got this! \u{1F4AA}".into())));
        let msg = composer.compose(&profile(MotivationType::Achievement)).await;
        assert_eq!(msg, "You got this! \u{1F4AA}");
    }

    #[tokio::test]
    async fn compose_truncates_generated_text() {
        let composer = MessageComposer::new(Arc::new(FixedGen("word ".repeat(60))));
        let msg = composer.compose(&profile(MotivationType::Achievement)).await;
        assert_eq!(msg.chars().count(), ON_DEMAND_MESSAGE_BUDGET);
    }

    #[tokio::test]
    async fn compose_falls_back_on_generation_failure() {
        let composer = MessageComposer::new(Arc::new(FailingGen));
        let msg = composer.compose(&profile(MotivationType::Social)).await;
        assert_eq!(msg, fallback_message(&profile(MotivationType::Social)));
    }

    #[tokio::test]
    async fn compose_batch_respects_batch_budget() {
        let composer = MessageComposer::new(Arc::new(FixedGen("nudge ".repeat(40))));
        let msg = composer.compose_batch(&context(0.4, 2)).await;
        assert!(msg.chars().count() <= BATCH_MESSAGE_BUDGET);
    }

    #[tokio::test]
    async fn compose_batch_falls_back_on_failure() {
        let composer = MessageComposer::new(Arc::new(FailingGen));
        let msg = composer.compose_batch(&context(0.1, 3)).await;
        assert_eq!(msg, batch_fallback_message(&context(0.1, 3)));
    }
}

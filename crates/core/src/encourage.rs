//! On-demand orchestration: the synchronous "encourage me now" path.
//!
//! Validate -> cache check -> analyze -> compose -> cache -> log -> publish.
//! External-port failures after validation degrade (fallback text, skipped
//! cache write, logged persistence failure) rather than failing the request.

use std::sync::Arc;
use std::time::Duration;

use crate::analysis::analyze_mission_progress;
use crate::compose::MessageComposer;
use crate::error::CoreError;
use crate::ports::{Cache, EventPublisher, GoalTracking, NotificationLog, TextGeneration};
use crate::types::{
    EncouragementMessage, MissionState, MotivationType, NewNotificationRecord, SuggestedTiming,
    UrgencyLevel,
};

/// How long an on-demand response stays cached.
pub const ENCOURAGEMENT_CACHE_TTL: Duration = Duration::from_secs(30 * 60);

/// Event topic emitted after a successful send.
pub const ENCOURAGEMENT_SENT_TOPIC: &str = "motivation.encouragement_sent";

/// Notification type recorded for on-demand sends.
const NOTIFICATION_TYPE: &str = "encouragement";

/// Cache key for an on-demand response: user plus completion rate rounded to
/// one decimal, so the cached message is reused until progress moves.
pub fn encouragement_cache_key(user_id: &str, missions: &[MissionState]) -> String {
    let completed = missions.iter().filter(|m| m.completed).count();
    let rate = if missions.is_empty() {
        0.0
    } else {
        completed as f64 / missions.len() as f64
    };
    format!("encouragement:{user_id}:{rate:.1}")
}

/// Delivery timing rule, keyed by urgency.
fn suggested_timing(urgency: UrgencyLevel) -> SuggestedTiming {
    match urgency {
        UrgencyLevel::High => SuggestedTiming::Immediate,
        UrgencyLevel::Medium => SuggestedTiming::OneHour,
        UrgencyLevel::Low => SuggestedTiming::NextMorning,
    }
}

/// Personalized tip table, keyed by motivation type.
fn personalized_tip(motivation_type: MotivationType) -> &'static str {
    match motivation_type {
        MotivationType::Achievement => "Break the goal into small wins and tick them off one by one!",
        MotivationType::HabitFormation => "Stick with it for 21 days and it becomes a habit!",
        MotivationType::Social => "Challenge a friend - everything is more fun together!",
        MotivationType::HealthBenefit => "The healthy habits you build today shape your future!",
    }
}

/// The single-user synchronous encouragement path.
pub struct MotivationService {
    goals: Arc<dyn GoalTracking>,
    composer: MessageComposer,
    cache: Arc<dyn Cache>,
    log: Arc<dyn NotificationLog>,
    events: Arc<dyn EventPublisher>,
}

impl MotivationService {
    pub fn new(
        goals: Arc<dyn GoalTracking>,
        textgen: Arc<dyn TextGeneration>,
        cache: Arc<dyn Cache>,
        log: Arc<dyn NotificationLog>,
        events: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            goals,
            composer: MessageComposer::new(textgen),
            cache,
            log,
            events,
        }
    }

    /// Produce a personalized encouragement message for one user.
    ///
    /// A cache hit returns the previously cached response unchanged, with no
    /// side effects re-triggered. Only `CoreError::Validation` (bad input)
    /// and `CoreError::Upstream` (daily-progress fetch) surface to the
    /// caller.
    pub async fn encourage(
        &self,
        user_id: &str,
        missions: &[MissionState],
    ) -> Result<EncouragementMessage, CoreError> {
        if user_id.trim().is_empty() {
            return Err(CoreError::Validation("user id is required".into()));
        }
        if missions.is_empty() {
            return Err(CoreError::Validation("mission states are required".into()));
        }

        let cache_key = encouragement_cache_key(user_id, missions);
        if let Some(cached) = self.cached_response(&cache_key).await {
            tracing::info!(user_id, "returning cached encouragement message");
            return Ok(cached);
        }

        let daily = self.goals.daily_progress(user_id).await?;
        let profile = analyze_mission_progress(user_id, missions, &daily);
        let message = self.composer.compose(&profile).await;

        let response = EncouragementMessage {
            message,
            motivation_type: profile.motivation_type,
            suggested_timing: suggested_timing(profile.urgency_level),
            personalized_tip: personalized_tip(profile.motivation_type).to_string(),
            priority: profile.urgency_level,
        };

        self.cache_response(&cache_key, &response).await;
        self.append_log(user_id, &response).await;
        self.events.publish(
            ENCOURAGEMENT_SENT_TOPIC,
            serde_json::json!({
                "user_id": user_id,
                "message_type": NOTIFICATION_TYPE,
            }),
        );

        tracing::info!(
            user_id,
            motivation_type = ?response.motivation_type,
            "encouragement message generated"
        );
        Ok(response)
    }

    /// Cache lookup; any read failure or corrupt entry is treated as a miss.
    async fn cached_response(&self, cache_key: &str) -> Option<EncouragementMessage> {
        let raw = match self.cache.get(cache_key).await {
            Ok(value) => value?,
            Err(err) => {
                tracing::warn!(cache_key, error = %err, "cache read failed, treating as miss");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(cached) => Some(cached),
            Err(err) => {
                tracing::warn!(cache_key, error = %err, "corrupt cache entry, regenerating");
                None
            }
        }
    }

    /// Cache write; failures are logged and swallowed.
    async fn cache_response(&self, cache_key: &str, response: &EncouragementMessage) {
        let raw = match serde_json::to_string(response) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(cache_key, error = %err, "failed to serialize response for cache");
                return;
            }
        };
        if let Err(err) = self.cache.set(cache_key, &raw, ENCOURAGEMENT_CACHE_TTL).await {
            tracing::warn!(cache_key, error = %err, "cache write failed, continuing");
        }
    }

    /// Log append; the message was already produced, so a persistence
    /// failure is logged but does not fail the request.
    async fn append_log(&self, user_id: &str, response: &EncouragementMessage) {
        let record = NewNotificationRecord {
            user_id: user_id.to_string(),
            mission_id: None,
            notification_type: NOTIFICATION_TYPE.to_string(),
            message: response.message.clone(),
            batch_id: None,
        };
        if let Err(err) = self.log.append(record).await {
            tracing::error!(user_id, error = %err, "failed to append notification log");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DailyProgress, UserMissionSnapshot};
    use assert_matches::assert_matches;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    // -- fakes ----------------------------------------------------------------

    struct FakeGoals(DailyProgress);

    #[async_trait]
    impl GoalTracking for FakeGoals {
        async fn daily_progress(&self, _user_id: &str) -> Result<DailyProgress, CoreError> {
            Ok(self.0.clone())
        }

        async fn users_with_active_missions(&self) -> Result<Vec<UserMissionSnapshot>, CoreError> {
            Ok(Vec::new())
        }
    }

    struct FailingGen;

    #[async_trait]
    impl TextGeneration for FailingGen {
        async fn generate(&self, _prompt: &str) -> Result<String, CoreError> {
            Err(CoreError::Generation("model offline".into()))
        }
    }

    struct FixedGen(&'static str);

    #[async_trait]
    impl TextGeneration for FixedGen {
        async fn generate(&self, _prompt: &str) -> Result<String, CoreError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, String>>,
        fail_reads: bool,
    }

    #[async_trait]
    impl Cache for MapCache {
        async fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
            if self.fail_reads {
                return Err(CoreError::Cache("connection refused".into()));
            }
            Ok(self.entries.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: &str, _ttl: Duration) -> Result<(), CoreError> {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn store_batch_message(
            &self,
            _user_id: &str,
            _message: &str,
        ) -> Result<(), CoreError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingLog {
        appended: AtomicU32,
        fail: bool,
    }

    #[async_trait]
    impl NotificationLog for CountingLog {
        async fn append(&self, _record: NewNotificationRecord) -> Result<i64, CoreError> {
            if self.fail {
                return Err(CoreError::Persistence("insert failed".into()));
            }
            Ok(self.appended.fetch_add(1, Ordering::SeqCst) as i64 + 1)
        }
    }

    #[derive(Default)]
    struct CountingPublisher {
        published: AtomicU32,
    }

    impl EventPublisher for CountingPublisher {
        fn publish(&self, _topic: &str, _payload: serde_json::Value) {
            self.published.fetch_add(1, Ordering::SeqCst);
        }
    }

    // -- harness --------------------------------------------------------------

    struct Harness {
        service: MotivationService,
        cache: Arc<MapCache>,
        log: Arc<CountingLog>,
        events: Arc<CountingPublisher>,
    }

    fn harness(textgen: Arc<dyn TextGeneration>, cache: MapCache, log: CountingLog) -> Harness {
        let cache = Arc::new(cache);
        let log = Arc::new(log);
        let events = Arc::new(CountingPublisher::default());
        let daily = DailyProgress {
            current_streak: 5,
            weekly_completion_rate: 0.75,
            today_completed_count: 3,
            today_total_count: 5,
        };
        let service = MotivationService::new(
            Arc::new(FakeGoals(daily)),
            textgen,
            Arc::clone(&cache) as Arc<dyn Cache>,
            Arc::clone(&log) as Arc<dyn NotificationLog>,
            Arc::clone(&events) as Arc<dyn EventPublisher>,
        );
        Harness {
            service,
            cache,
            log,
            events,
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

    // -- validation -----------------------------------------------------------

    #[tokio::test]
    async fn empty_user_id_is_rejected() {
        let h = harness(Arc::new(FailingGen), MapCache::default(), CountingLog::default());
        let err = h.service.encourage("  ", &missions(1, 0)).await.unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    #[tokio::test]
    async fn empty_mission_list_is_rejected() {
        let h = harness(Arc::new(FailingGen), MapCache::default(), CountingLog::default());
        let err = h.service.encourage("u1", &[]).await.unwrap_err();
        assert_matches!(err, CoreError::Validation(_));
    }

    // -- cache key ------------------------------------------------------------

    #[test]
    fn cache_key_rounds_completion_rate() {
        assert_eq!(
            encouragement_cache_key("u1", &missions(1, 2)),
            "encouragement:u1:0.3"
        );
        assert_eq!(
            encouragement_cache_key("u1", &missions(3, 0)),
            "encouragement:u1:1.0"
        );
    }

    // -- happy path -----------------------------------------------------------

    #[tokio::test]
    async fn miss_generates_caches_logs_and_publishes() {
        let h = harness(
            Arc::new(FixedGen("Nice work! \u{1F44D}")),
            MapCache::default(),
            CountingLog::default(),
        );
        let response = h.service.encourage("u1", &missions(4, 1)).await.unwrap();

        assert_eq!(response.message, "Nice work! \u{1F44D}");
        assert_eq!(response.motivation_type, MotivationType::Achievement);
        assert_eq!(response.priority, UrgencyLevel::Low);
        assert_eq!(response.suggested_timing, SuggestedTiming::NextMorning);
        assert!(!response.personalized_tip.is_empty());

        assert_eq!(h.log.appended.load(Ordering::SeqCst), 1);
        assert_eq!(h.events.published.load(Ordering::SeqCst), 1);
        assert_eq!(h.cache.entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn timing_follows_urgency() {
        // rate 0.25 -> HIGH urgency -> immediate.
        let h = harness(
            Arc::new(FixedGen("go!")),
            MapCache::default(),
            CountingLog::default(),
        );
        let response = h.service.encourage("u1", &missions(1, 3)).await.unwrap();
        assert_eq!(response.priority, UrgencyLevel::High);
        assert_eq!(response.suggested_timing, SuggestedTiming::Immediate);
    }

    // -- cache hit ------------------------------------------------------------

    #[tokio::test]
    async fn cache_hit_returns_identical_response_without_side_effects() {
        let h = harness(
            Arc::new(FixedGen("first answer")),
            MapCache::default(),
            CountingLog::default(),
        );
        let first = h.service.encourage("u1", &missions(2, 3)).await.unwrap();
        let second = h.service.encourage("u1", &missions(2, 3)).await.unwrap();

        assert_eq!(first, second);
        // Log and event fired exactly once, for the first call.
        assert_eq!(h.log.appended.load(Ordering::SeqCst), 1);
        assert_eq!(h.events.published.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn changed_completion_rate_misses_the_cache() {
        let h = harness(
            Arc::new(FixedGen("answer")),
            MapCache::default(),
            CountingLog::default(),
        );
        h.service.encourage("u1", &missions(1, 4)).await.unwrap();
        h.service.encourage("u1", &missions(4, 1)).await.unwrap();
        assert_eq!(h.log.appended.load(Ordering::SeqCst), 2);
    }

    // -- degraded collaborators ------------------------------------------------

    #[tokio::test]
    async fn generation_failure_degrades_to_fallback() {
        let h = harness(Arc::new(FailingGen), MapCache::default(), CountingLog::default());
        let response = h.service.encourage("u1", &missions(1, 4)).await.unwrap();
        assert!(!response.message.is_empty());
        assert!(response.message.chars().count() <= crate::compose::ON_DEMAND_MESSAGE_BUDGET);
    }

    #[tokio::test]
    async fn cache_read_failure_is_treated_as_miss() {
        let h = harness(
            Arc::new(FixedGen("answer")),
            MapCache {
                fail_reads: true,
                ..Default::default()
            },
            CountingLog::default(),
        );
        let response = h.service.encourage("u1", &missions(2, 2)).await.unwrap();
        assert_eq!(response.message, "answer");
        assert_eq!(h.log.appended.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn log_failure_does_not_fail_the_request() {
        let h = harness(
            Arc::new(FixedGen("answer")),
            MapCache::default(),
            CountingLog {
                fail: true,
                ..Default::default()
            },
        );
        let response = h.service.encourage("u1", &missions(2, 2)).await.unwrap();
        assert_eq!(response.message, "answer");
        // Event still published; the request succeeded.
        assert_eq!(h.events.published.load(Ordering::SeqCst), 1);
    }
}

//! Schedule math for the daily batch worker.

use chrono::{Duration, NaiveDateTime, NaiveTime};

/// Default wall-clock time of the daily batch run.
pub const DEFAULT_RUN_AT: &str = "09:00";

/// Time to sleep from `now` until the next occurrence of `run_at`.
///
/// If `run_at` has already passed today (or is exactly now), the next run is
/// tomorrow.
pub fn duration_until_next_run(now: NaiveDateTime, run_at: NaiveTime) -> std::time::Duration {
    let today = now.date().and_time(run_at);
    let next = if today > now {
        today
    } else {
        today + Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}

/// Parse an `HH:MM` wall-clock time, e.g. `"09:00"`.
pub fn parse_run_at(value: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn nine() -> NaiveTime {
        NaiveTime::from_hms_opt(9, 0, 0).unwrap()
    }

    #[test]
    fn before_the_run_time_waits_until_today() {
        let wait = duration_until_next_run(at(7, 0, 0), nine());
        assert_eq!(wait.as_secs(), 2 * 60 * 60);
    }

    #[test]
    fn after_the_run_time_waits_until_tomorrow() {
        let wait = duration_until_next_run(at(10, 0, 0), nine());
        assert_eq!(wait.as_secs(), 23 * 60 * 60);
    }

    #[test]
    fn exactly_at_the_run_time_waits_a_full_day() {
        let wait = duration_until_next_run(at(9, 0, 0), nine());
        assert_eq!(wait.as_secs(), 24 * 60 * 60);
    }

    #[test]
    fn parse_run_at_accepts_hh_mm() {
        assert_eq!(parse_run_at("09:00"), Some(nine()));
        assert_eq!(parse_run_at("23:30"), NaiveTime::from_hms_opt(23, 30, 0));
        assert_eq!(parse_run_at("9am"), None);
    }
}

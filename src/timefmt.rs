//! Timestamp formatting for the dashboard.
//!
//! Absolute form renders a locale-style long date; relative form buckets
//! the delta into seconds/minutes/hours/days and falls back to the
//! absolute form once the delta reaches 7 days.

use chrono::{DateTime, TimeZone, Utc};

/// Format an epoch-millisecond timestamp as a long date string,
/// e.g. `Apr 5, 2025, 03:12 PM`.
#[must_use]
pub fn format_date(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms).single() {
        Some(t) => t.format("%b %-d, %Y, %I:%M %p").to_string(),
        None => "unknown".into(),
    }
}

/// Format an epoch-millisecond timestamp relative to `now`,
/// e.g. `2 hours ago`.
///
/// Seconds are always plural, matching the dashboard's display convention;
/// minutes, hours and days select singular/plural exactly.
#[must_use]
pub fn format_relative_time(timestamp_ms: i64, now: DateTime<Utc>) -> String {
    let diff_seconds = (now.timestamp_millis() - timestamp_ms) / 1000;

    if diff_seconds < 60 {
        return format!("{diff_seconds} seconds ago");
    }

    let diff_minutes = diff_seconds / 60;
    if diff_minutes < 60 {
        return format!("{diff_minutes} minute{} ago", plural(diff_minutes));
    }

    let diff_hours = diff_minutes / 60;
    if diff_hours < 24 {
        return format!("{diff_hours} hour{} ago", plural(diff_hours));
    }

    let diff_days = diff_hours / 24;
    if diff_days < 7 {
        return format!("{diff_days} day{} ago", plural(diff_days));
    }

    format_date(timestamp_ms)
}

/// Format relative to the current time.
#[must_use]
pub fn format_relative_time_now(timestamp_ms: i64) -> String {
    format_relative_time(timestamp_ms, Utc::now())
}

const fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 5, 15, 12, 0).single().expect("valid date")
    }

    fn ago(seconds: i64) -> i64 {
        now().timestamp_millis() - seconds * 1000
    }

    #[test]
    fn test_seconds_bucket() {
        assert_eq!(format_relative_time(ago(30), now()), "30 seconds ago");
        // Seconds stay plural even at one
        assert_eq!(format_relative_time(ago(1), now()), "1 seconds ago");
    }

    #[test]
    fn test_minutes_bucket() {
        assert_eq!(format_relative_time(ago(90), now()), "1 minute ago");
        assert_eq!(format_relative_time(ago(120), now()), "2 minutes ago");
        assert_eq!(format_relative_time(ago(59 * 60), now()), "59 minutes ago");
    }

    #[test]
    fn test_hours_bucket() {
        assert_eq!(format_relative_time(ago(7200), now()), "2 hours ago");
        assert_eq!(format_relative_time(ago(3600), now()), "1 hour ago");
    }

    #[test]
    fn test_days_bucket() {
        assert_eq!(format_relative_time(ago(86_400), now()), "1 day ago");
        assert_eq!(format_relative_time(ago(6 * 86_400), now()), "6 days ago");
    }

    #[test]
    fn test_falls_back_to_absolute_after_a_week() {
        let stamp = ago(8 * 86_400);
        assert_eq!(format_relative_time(stamp, now()), format_date(stamp));
    }

    #[test]
    fn test_format_date() {
        let stamp = now().timestamp_millis();
        assert_eq!(format_date(stamp), "Apr 5, 2025, 03:12 PM");
    }
}

//! Relative review-time phrases to absolute instants.
//!
//! The page only ever shows coarse phrases ("2 days ago", "a month ago",
//! "March 2022"), so exact timestamps are unobtainable. Months and years use
//! fixed 30/365-day offsets; the drift this accumulates is tolerated because
//! downstream aggregation buckets by calendar month anyway.

use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use regex::Regex;

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)").unwrap());

/// Maps a relative-time phrase to an absolute instant, anchored at `now`.
///
/// Deterministic given `now` and total: unrecognized input degrades to `now`
/// (logged, never an error), so one odd phrase can never abort extraction.
pub fn normalize(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let lower = text.to_lowercase();

    if lower.contains("a day ago") || lower.contains("1 day ago") {
        return now - Duration::days(1);
    }
    if lower.contains("days ago") {
        if let Some(days) = first_number(&lower) {
            return now - Duration::days(days);
        }
    }
    if lower.contains("a week ago") || lower.contains("1 week ago") {
        return now - Duration::weeks(1);
    }
    if lower.contains("weeks ago") {
        if let Some(weeks) = first_number(&lower) {
            return now - Duration::weeks(weeks);
        }
    }
    if lower.contains("a month ago") || lower.contains("1 month ago") {
        return now - Duration::days(30);
    }
    if lower.contains("months ago") {
        if let Some(months) = first_number(&lower) {
            return now - Duration::days(30 * months);
        }
    }
    if lower.contains("a year ago") || lower.contains("1 year ago") {
        return now - Duration::days(365);
    }
    if lower.contains("years ago") {
        if let Some(years) = first_number(&lower) {
            return now - Duration::days(365 * years);
        }
    }
    if lower.contains("an hour ago") || lower.contains("1 hour ago") {
        return now - Duration::hours(1);
    }
    if lower.contains("hours ago") {
        if let Some(hours) = first_number(&lower) {
            return now - Duration::hours(hours);
        }
    }
    if lower.contains("minutes ago") {
        if let Some(minutes) = first_number(&lower) {
            return now - Duration::minutes(minutes);
        }
    }

    // "March 2022" style: mid-month as an approximation.
    if let Some(parsed) = parse_month_year(text) {
        return parsed;
    }

    tracing::warn!(text, "could not parse review time; using scrape time");
    now
}

fn first_number(text: &str) -> Option<i64> {
    FIRST_NUMBER.find(text)?.as_str().parse().ok()
}

fn parse_month_year(text: &str) -> Option<DateTime<Utc>> {
    let padded = format!("{} 15", text.trim());
    let date = NaiveDate::parse_from_str(&padded, "%B %Y %d").ok()?;
    Some(date.and_hms_opt(0, 0, 0)?.and_utc())
}

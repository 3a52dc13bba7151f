//! Relative-time normalization.
//!
//! Profile pages show times as `<n> <unit> ago`. These are resolved against a
//! reference time into fixed absolute formats. Months count as 30 days and
//! years as 365 days; this is an approximation, not calendar arithmetic.
//!
//! The two entry points deliberately differ in what they return when the
//! phrase cannot be resolved: [`relative_to_date`] hands back the input,
//! [`post_timestamp`] returns [`NOT_AVAILABLE`].

use std::sync::LazyLock;

use chrono::{NaiveDateTime, TimeDelta};
use profsync_core::ProfileRecord;
use regex::Regex;

/// `dd-mmm-yy`, e.g. `11-Oct-23`.
pub const DATE_FORMAT: &str = "%d-%b-%y";

/// `dd-mmm-yy hh:mm AM/PM`, e.g. `10-Jan-24 01:00 PM`.
pub const DATE_TIME_FORMAT: &str = "%d-%b-%y %I:%M %p";

/// Marker written when a post timestamp cannot be resolved.
pub const NOT_AVAILABLE: &str = "N/A";

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(second|minute|hour|day|week|month|year)s?\s*ago")
        .expect("valid relative time regex")
});

/// Converts a relative phrase to `dd-mmm-yy`. Unresolvable text comes back unchanged.
#[must_use]
pub fn relative_to_date(text: &str, now: NaiveDateTime) -> String {
    match resolve(text, now) {
        Some(at) => at.format(DATE_FORMAT).to_string(),
        None => text.to_owned(),
    }
}

/// Converts a relative phrase to `dd-mmm-yy hh:mm AM/PM`. Unresolvable text
/// (including empty text) becomes [`NOT_AVAILABLE`].
#[must_use]
pub fn post_timestamp(text: &str, now: NaiveDateTime) -> String {
    match resolve(text, now) {
        Some(at) => at.format(DATE_TIME_FORMAT).to_string(),
        None => NOT_AVAILABLE.to_owned(),
    }
}

/// Formats `now` the way the observation timestamp column expects.
#[must_use]
pub fn observation_stamp(now: NaiveDateTime) -> String {
    now.format(DATE_TIME_FORMAT).to_string()
}

/// Resolves the relative JOINED and LDATE-TIME values of a raw record in place.
pub fn resolve_relative_times(record: &mut ProfileRecord, now: NaiveDateTime) {
    if !record.joined.trim().is_empty() {
        record.joined = relative_to_date(record.joined.trim(), now);
    }
    record.last_post_at = post_timestamp(&record.last_post_at, now);
}

/// Local wall-clock time without a zone, as the sheet formats expect.
#[must_use]
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn resolve(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let lowered = text.trim().to_lowercase();
    let caps = RELATIVE_RE.captures(&lowered)?;
    let amount: i64 = caps.get(1)?.as_str().parse().ok()?;
    let offset = unit_offset(amount, caps.get(2)?.as_str())?;
    now.checked_sub_signed(offset)
}

fn unit_offset(amount: i64, unit: &str) -> Option<TimeDelta> {
    match unit {
        "second" => TimeDelta::try_seconds(amount),
        "minute" => TimeDelta::try_minutes(amount),
        "hour" => TimeDelta::try_hours(amount),
        "day" => TimeDelta::try_days(amount),
        "week" => TimeDelta::try_weeks(amount),
        "month" => amount.checked_mul(30).and_then(TimeDelta::try_days),
        "year" => amount.checked_mul(365).and_then(TimeDelta::try_days),
        _ => None,
    }
}

#[cfg(test)]
#[path = "timefmt_test.rs"]
mod tests;

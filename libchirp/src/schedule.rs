//! Schedule-time parsing
//!
//! Parses the time formats accepted when queueing a post. All parsing is
//! pure against an injected "now" so creation-time validation and tests are
//! deterministic.
//!
//! Accepted formats:
//! - `"18:00"` — today at that time
//! - `"12-31 23:59"` — that date in the current year
//! - `"2024-01-01 00:00"` — exact instant
//! - Relative durations: `"30m"`, `"2h"`, `"1day"`

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{ChirpError, Result};

/// Parse a schedule string relative to `now`.
///
/// # Errors
///
/// Returns `InvalidInput` if the string is empty or matches none of the
/// accepted formats. Whether the result lies in the future is checked by the
/// caller at creation time, not here.
pub fn parse_schedule(input: &str, now: NaiveDateTime) -> Result<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ChirpError::InvalidInput(
            "Schedule time cannot be empty".to_string(),
        ));
    }

    if let Ok(time) = NaiveTime::parse_from_str(input, "%H:%M") {
        return Ok(now.date().and_time(time));
    }

    if let Some(dt) = parse_month_day(input, now.year()) {
        return Ok(dt);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        return Ok(dt);
    }

    if let Ok(duration) = parse_duration(input) {
        return Ok(now + duration);
    }

    Err(ChirpError::InvalidInput(format!(
        "Could not parse schedule time: {}",
        input
    )))
}

/// Parse `"MM-DD HH:MM"` against the given year.
fn parse_month_day(input: &str, year: i32) -> Option<NaiveDateTime> {
    let (date_part, time_part) = input.split_once(' ')?;
    let (month, day) = date_part.split_once('-')?;

    // A four-digit leading field is a full date, not a month.
    if month.len() > 2 {
        return None;
    }

    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let time = NaiveTime::parse_from_str(time_part, "%H:%M").ok()?;

    NaiveDate::from_ymd_opt(year, month, day).map(|d| d.and_time(time))
}

/// Parse a relative duration like `"30m"` or `"2h"`.
fn parse_duration(input: &str) -> Result<Duration> {
    let std_duration = humantime::parse_duration(input).map_err(|e| {
        ChirpError::InvalidInput(format!("Could not parse duration '{}': {}", input, e))
    })?;

    Duration::try_seconds(std_duration.as_secs() as i64)
        .ok_or_else(|| ChirpError::InvalidInput("Duration out of range".to_string()))
}

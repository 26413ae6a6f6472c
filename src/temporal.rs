//! Locale-independent date parsing.
//!
//! Regex pre-screening picks the shape of the input, then chrono builds the
//! timestamp. Values without an explicit offset are read as UTC. Every
//! successful parse yields milliseconds since the Unix epoch.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use regex::Captures;

use crate::options::DatePreference;
use crate::regexes::{
    DATE_EURO_PATTERN, DATE_ISO_PATTERN, DATE_NUMERIC_PATTERN, DATETIME_GENERAL_PATTERN,
    DATETIME_ISO_PATTERN,
};

/// Textual formats tried after the numeric shapes ("March 5, 2024", "5 Mar 2024").
const TEXTUAL_DATE_FORMATS: &[&str] = &["%B %d, %Y", "%B %d %Y", "%d %B %Y", "%d %B, %Y"];
const TEXTUAL_DATETIME_FORMATS: &[&str] = &["%B %d, %Y %H:%M:%S", "%B %d, %Y %H:%M"];

/// Parse `text` as a date, returning epoch milliseconds.
pub fn parse_date(text: &str, preference: DatePreference) -> Option<i64> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(caps) = DATETIME_ISO_PATTERN.captures(trimmed) {
        return parse_iso_datetime(&caps);
    }

    if let Some(caps) = DATE_ISO_PATTERN.captures(trimmed) {
        let date = NaiveDate::from_ymd_opt(
            capture_num(&caps, 1)?,
            capture_num(&caps, 2)?,
            capture_num(&caps, 3)?,
        )?;
        return Some(midnight_millis(date));
    }

    if let Some(caps) = DATETIME_GENERAL_PATTERN.captures(trimmed) {
        return parse_general_datetime(trimmed, &caps, preference);
    }

    if let Some(caps) = DATE_NUMERIC_PATTERN.captures(trimmed) {
        let date = resolve_numeric_date(&caps, preference)?;
        return Some(midnight_millis(date));
    }

    if let Some(caps) = DATE_EURO_PATTERN.captures(trimmed) {
        let date = resolve_numeric_date(&caps, DatePreference::DmyFormat)?;
        return Some(midnight_millis(date));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.timestamp_millis());
    }

    for format in TEXTUAL_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for format in TEXTUAL_DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(midnight_millis(date));
        }
    }

    None
}

/// Returns true if `text` parses as a date.
#[inline]
pub fn is_date(text: &str, preference: DatePreference) -> bool {
    parse_date(text, preference).is_some()
}

/// Convert epoch milliseconds into a UTC timestamp.
pub fn to_datetime(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

fn midnight_millis(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

fn capture_num<T: std::str::FromStr>(caps: &Captures<'_>, idx: usize) -> Option<T> {
    caps.get(idx)?.as_str().parse().ok()
}

/// Expand a two-digit year: 00-49 is 20xx, 50-99 is 19xx.
fn expand_year(raw: &str) -> Option<i32> {
    let year: i32 = raw.parse().ok()?;
    if raw.len() > 2 {
        Some(year)
    } else if year < 50 {
        Some(2000 + year)
    } else {
        Some(1900 + year)
    }
}

/// Build a date from `(a, b, year)` captures, honouring the preferred
/// day/month order and falling back to the other order when the preferred
/// one is not a valid calendar date.
fn resolve_numeric_date(caps: &Captures<'_>, preference: DatePreference) -> Option<NaiveDate> {
    let a: u32 = capture_num(caps, 1)?;
    let b: u32 = capture_num(caps, 2)?;
    let year = expand_year(caps.get(3)?.as_str())?;

    let (first, second) = if preference.is_dmy() {
        ((b, a), (a, b))
    } else {
        ((a, b), (b, a))
    };

    NaiveDate::from_ymd_opt(year, first.0, first.1)
        .or_else(|| NaiveDate::from_ymd_opt(year, second.0, second.1))
}

fn parse_iso_datetime(caps: &Captures<'_>) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(
        capture_num(caps, 1)?,
        capture_num(caps, 2)?,
        capture_num(caps, 3)?,
    )?;

    let nanos = match caps.get(7) {
        Some(frac) => {
            let digits: String = frac.as_str().chars().take(9).collect();
            let scale = 10u32.pow(9 - digits.len() as u32);
            digits.parse::<u32>().ok()? * scale
        }
        None => 0,
    };
    let second = caps.get(6).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let time = NaiveTime::from_hms_nano_opt(capture_num(caps, 4)?, capture_num(caps, 5)?, second, nanos)?;

    let local = date.and_time(time).and_utc().timestamp_millis();
    let offset_secs = match caps.get(8) {
        Some(zone) => parse_offset_seconds(zone.as_str())?,
        None => 0,
    };
    Some(local - i64::from(offset_secs) * 1000)
}

/// Parse `Z`, `+05:30` or `-0800` into seconds east of UTC.
fn parse_offset_seconds(zone: &str) -> Option<i32> {
    if zone == "Z" {
        return Some(0);
    }
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let digits: String = zone[1..].chars().filter(char::is_ascii_digit).collect();
    if digits.len() != 4 {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    Some(sign * (hours * 3600 + minutes * 60))
}

fn parse_general_datetime(
    text: &str,
    caps: &Captures<'_>,
    preference: DatePreference,
) -> Option<i64> {
    // Dotted dates are day-first regardless of preference.
    let preference = if text.contains('.') {
        DatePreference::DmyFormat
    } else {
        preference
    };
    let date = resolve_numeric_date(caps, preference)?;

    let mut hour: u32 = capture_num(caps, 4)?;
    if let Some(meridiem) = caps.get(7) {
        if hour == 0 || hour > 12 {
            return None;
        }
        let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
        hour = match (pm, hour) {
            (false, 12) => 0,
            (true, 12) => 12,
            (true, h) => h + 12,
            (false, h) => h,
        };
    }
    let second = caps.get(6).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let time = NaiveTime::from_hms_opt(hour, capture_num(caps, 5)?, second)?;

    Some(date.and_time(time).and_utc().timestamp_millis())
}

//! Locale normalization helpers
//!
//! Stateless conversions used by the transform phase: Spanish long dates
//! to ISO, 12h clock to 24h, date-range validation and raw record
//! cleaning. All parsers return `None` for malformed input instead of
//! failing the batch; the caller decides whether to drop the record.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

/// Maximum span accepted by [`validate_date_range`], in days.
pub const MAX_RANGE_DAYS: i64 = 365;

static SPANISH_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2}) de (\w+) de (\d{4})").unwrap());

static TIME_12H_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2}):(\d{2})(?::(\d{2}))?\s*(AM|PM)").unwrap());

const MONTHS: &[(&str, &str)] = &[
    ("enero", "01"),
    ("febrero", "02"),
    ("marzo", "03"),
    ("abril", "04"),
    ("mayo", "05"),
    ("junio", "06"),
    ("julio", "07"),
    ("agosto", "08"),
    ("septiembre", "09"),
    ("octubre", "10"),
    ("noviembre", "11"),
    ("diciembre", "12"),
];

/// Convert a Spanish long date ("6 de septiembre de 2025") to ISO
/// `YYYY-MM-DD`. Returns `None` for unknown months, out-of-range
/// day/year, or text that does not match the pattern at all.
pub fn parse_spanish_date(date_str: &str) -> Option<String> {
    let trimmed = date_str.trim().to_lowercase();
    if trimmed.is_empty() {
        warn!("empty date string");
        return None;
    }

    let caps = match SPANISH_DATE_RE.captures(&trimmed) {
        Some(caps) => caps,
        None => {
            warn!(date = %date_str, "unrecognized date format");
            return None;
        }
    };

    let day: u32 = caps[1].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let month = MONTHS
        .iter()
        .find(|(name, _)| *name == &caps[2])
        .map(|(_, number)| *number);

    let month = match month {
        Some(m) => m,
        None => {
            warn!(month = &caps[2], "unknown month name");
            return None;
        }
    };

    if !(1..=31).contains(&day) {
        warn!(day, "day out of range");
        return None;
    }
    if !(1900..=2100).contains(&year) {
        warn!(year, "year out of range");
        return None;
    }

    let result = format!("{year}-{month}-{day:02}");
    debug!(from = %date_str, to = %result, "date normalized");
    Some(result)
}

/// Convert a 12h clock time ("08:00 PM") to 24h `HH:MM:SS`.
///
/// Accepts an optional seconds component. Returns `None` when the hour
/// is outside 1..=12, minutes/seconds are outside 0..=59, or the input
/// does not carry an AM/PM marker.
pub fn convert_time_12h_to_24h(time_str: &str) -> Option<String> {
    let trimmed = time_str.trim();
    if trimmed.is_empty() {
        warn!("empty time string");
        return None;
    }

    let caps = match TIME_12H_RE.captures(trimmed) {
        Some(caps) => caps,
        None => {
            warn!(time = %time_str, "unrecognized time format");
            return None;
        }
    };

    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let second: u32 = caps.get(3).map_or(Some(0), |s| s.as_str().parse().ok())?;
    let period = caps[4].to_uppercase();

    if !(1..=12).contains(&hour) || minute > 59 || second > 59 {
        warn!(time = %time_str, "time component out of range");
        return None;
    }

    if period == "PM" && hour != 12 {
        hour += 12;
    } else if period == "AM" && hour == 12 {
        hour = 0;
    }

    Some(format!("{hour:02}:{minute:02}:{second:02}"))
}

/// Validate an inclusive ISO date range: both bounds parse as
/// `YYYY-MM-DD`, start <= end, and the span is at most
/// [`MAX_RANGE_DAYS`] days.
pub fn validate_date_range(start_date: &str, end_date: &str) -> bool {
    let start = match NaiveDate::parse_from_str(start_date, "%Y-%m-%d") {
        Ok(d) => d,
        Err(e) => {
            warn!(date = %start_date, error = %e, "invalid start date");
            return false;
        }
    };
    let end = match NaiveDate::parse_from_str(end_date, "%Y-%m-%d") {
        Ok(d) => d,
        Err(e) => {
            warn!(date = %end_date, error = %e, "invalid end date");
            return false;
        }
    };
    date_range_is_valid(start, end)
}

/// Typed variant of [`validate_date_range`].
pub fn date_range_is_valid(start: NaiveDate, end: NaiveDate) -> bool {
    if start > end {
        warn!(%start, %end, "start date after end date");
        return false;
    }
    let span = (end - start).num_days();
    if span > MAX_RANGE_DAYS {
        warn!(span_days = span, "date range too wide");
        return false;
    }
    true
}

/// Drop malformed entries from a raw batch.
///
/// Non-object items are discarded with a warning; `null` and
/// blank-string fields are stripped; items left without any field are
/// dropped entirely.
pub fn clean_records(records: Vec<Value>) -> Vec<Value> {
    let total = records.len();
    let mut cleaned = Vec::with_capacity(total);

    for (index, record) in records.into_iter().enumerate() {
        let map = match record {
            Value::Object(map) => map,
            _ => {
                warn!(index, "record is not an object, dropping");
                continue;
            }
        };

        let kept: serde_json::Map<String, Value> = map
            .into_iter()
            .filter(|(_, v)| match v {
                Value::Null => false,
                Value::String(s) => !s.trim().is_empty(),
                _ => true,
            })
            .collect();

        if !kept.is_empty() {
            cleaned.push(Value::Object(kept));
        }
    }

    debug!(before = total, after = cleaned.len(), "raw batch cleaned");
    cleaned
}

//! Timestamp formatting and parsing in the toolkit's `%Y-%m-%d %H:%M:%S` shape.

use crate::UtilsError;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use std::time::Duration;

/// Timestamp format shared across the toolkit.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Current local time as `%Y-%m-%d %H:%M:%S`.
#[must_use]
pub fn now_str() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Formats unix seconds as a local timestamp. Out-of-range seconds render empty.
#[must_use]
pub fn format_ts(unix_seconds: i64) -> String {
    Local
        .timestamp_opt(unix_seconds, 0)
        .single()
        .map_or_else(String::new, |dt| dt.format(TIMESTAMP_FORMAT).to_string())
}

/// Parses a `%Y-%m-%d %H:%M:%S` timestamp in the local offset to unix seconds.
pub fn parse_ts(value: &str) -> Result<i64, UtilsError> {
    let naive = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|err| UtilsError::from(format!("invalid timestamp `{value}`: {err}")))?;
    local_to_unix(naive)
}

/// Parses a timestamp in any of the common shapes the toolkit accepts:
/// RFC 3339, `%Y-%m-%d %H:%M:%S` (also `/`-separated), date-only, or a
/// bare unix-seconds number.
pub fn parse_ts_any(value: &str) -> Result<i64, UtilsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(UtilsError::from("empty timestamp"));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.timestamp());
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return local_to_unix(naive);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return local_to_unix(date.and_time(NaiveTime::MIN));
        }
    }
    if trimmed.chars().all(|c| c.is_ascii_digit() || c == '-') {
        return trimmed
            .parse::<i64>()
            .map_err(|err| UtilsError::from(format!("invalid unix seconds `{value}`: {err}")));
    }
    Err(UtilsError::from(format!("unrecognized timestamp `{value}`")))
}

/// Parses `300ms`, `5s`, `2m` or `1h` into a [`Duration`]. A bare number is
/// taken as milliseconds.
pub fn parse_duration(value: &str) -> Result<Duration, UtilsError> {
    let trimmed = value.trim();
    let split = trimmed.find(|c: char| !c.is_ascii_digit()).unwrap_or(trimmed.len());
    let (digits, unit) = trimmed.split_at(split);
    let amount: u64 = digits
        .parse()
        .map_err(|_| UtilsError::from(format!("invalid duration `{value}`")))?;
    let millis = match unit {
        "" | "ms" => amount,
        "s" => amount.saturating_mul(1_000),
        "m" => amount.saturating_mul(60_000),
        "h" => amount.saturating_mul(3_600_000),
        _ => return Err(UtilsError::from(format!("unknown duration unit `{unit}` in `{value}`"))),
    };
    Ok(Duration::from_millis(millis))
}

fn local_to_unix(naive: NaiveDateTime) -> Result<i64, UtilsError> {
    Local
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.timestamp())
        .ok_or_else(|| UtilsError::from(format!("ambiguous local time `{naive}`")))
}

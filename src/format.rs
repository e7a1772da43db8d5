//! Display helpers for file sizes and timestamps.

use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

/// Placeholder shown when a record carries no timestamp.
pub const MISSING_DATE: &str = "—";

/// Output format used by [`format_date_time`].
pub const DATE_TIME_FORMAT: &str = "%d %b %Y, %H:%M";

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Format a byte count for display.
///
/// Zero and negative counts render as `"0 B"`. Larger values are scaled by
/// 1024 up to GB and shown with one decimal, except when the scaled value is
/// at least 10 or no scaling happened. Halves round up.
pub fn format_bytes(bytes: i64) -> String {
    if bytes <= 0 {
        return "0 B".to_string();
    }

    let mut exponent = 0;
    let mut threshold: i64 = 1024;
    while exponent < SIZE_UNITS.len() - 1 && bytes >= threshold {
        exponent += 1;
        threshold = threshold.saturating_mul(1024);
    }

    let value = bytes as f64 / 1024f64.powi(exponent as i32);
    let decimals = if value >= 10.0 || exponent == 0 { 0 } else { 1 };
    // `{:.*}` rounds ties to even.
    let factor = 10f64.powi(decimals as i32);
    let rounded = (value * factor).round() / factor;
    format!("{:.*} {}", decimals, rounded, SIZE_UNITS[exponent])
}

/// Parse a timestamp in RFC 3339 or `YYYY-MM-DD HH:MM:SS` (UTC) form.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format an optional timestamp in the given timezone.
///
/// `None` and empty strings render as [`MISSING_DATE`]. Unparseable input is
/// returned unchanged; an unknown timezone falls back to UTC.
pub fn format_date_time(value: Option<&str>, timezone: &str) -> String {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => return MISSING_DATE.to_string(),
    };

    match parse_timestamp(value) {
        Some(dt) => format_utc_datetime(&dt, timezone, DATE_TIME_FORMAT),
        None => value.to_string(),
    }
}

/// Format a `DateTime<Utc>` in the specified timezone.
pub fn format_utc_datetime(dt: &DateTime<Utc>, timezone: &str, format: &str) -> String {
    let tz: Tz = match timezone.parse() {
        Ok(tz) => tz,
        Err(_) => return dt.format(format).to_string(),
    };
    dt.with_timezone(&tz).format(format).to_string()
}

//! Time and duration formatting shared by the session and dashboard views.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

/// Format seconds as `M:SS`, or `H:MM:SS` from one hour up.
///
/// Fractions are truncated; negative input formats as zero.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

/// Parse a backend timestamp.
///
/// Accepts RFC 3339 (with offset) and naive ISO-8601, which is taken to be
/// local time.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Local>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Local.from_local_datetime(&naive).earliest()
}

/// Human-readable date, e.g. `1 May 2024, 10:03:00 am`.
///
/// Unparseable input is returned as-is.
pub fn format_date(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%-d %b %Y, %I:%M:%S %P").to_string(),
        None if raw.trim().is_empty() => "-".to_string(),
        None => raw.to_string(),
    }
}

/// Seconds between two backend timestamps, never negative.
pub fn span_seconds(start: &str, end: &str) -> Option<f64> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    let millis = (end - start).num_milliseconds().max(0);
    Some(millis as f64 / 1000.0)
}

/// A chunk's recorded length as `Xm Ys`.
pub fn format_span(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}m {}s", total / 60, total % 60)
}

/// Aggregate recorded time as `Hh Mm`.
pub fn format_hours_minutes(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{}h {}m", total / 3600, (total % 3600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(3661.0), "1:01:01");
        assert_eq!(format_time(61.0), "1:01");
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(59.9), "0:59");
        assert_eq!(format_time(36000.0), "10:00:00");
        assert_eq!(format_time(-3.0), "0:00");
    }

    #[test]
    fn test_span_naive_timestamps() {
        let secs = span_seconds("2024-05-01T10:00:00.500000", "2024-05-01T10:03:05.500000");
        assert_eq!(secs, Some(185.0));
        assert_eq!(format_span(185.0), "3m 5s");
    }

    #[test]
    fn test_span_with_offsets() {
        let secs = span_seconds("2024-05-01T10:00:00+02:00", "2024-05-01T08:01:30Z");
        assert_eq!(secs, Some(90.0));
    }

    #[test]
    fn test_span_rejects_garbage_and_clamps() {
        assert_eq!(span_seconds("yesterday", "2024-05-01T10:00:00"), None);
        assert_eq!(span_seconds("2024-05-01T10:00:10", "2024-05-01T10:00:00"), Some(0.0));
    }

    #[test]
    fn test_format_hours_minutes() {
        assert_eq!(format_hours_minutes(0.0), "0h 0m");
        assert_eq!(format_hours_minutes(3720.0), "1h 2m");
        assert_eq!(format_hours_minutes(7199.0), "1h 59m");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2024-05-01T10:03:00"), "1 May 2024, 10:03:00 am");
        assert_eq!(format_date("2024-12-24T18:30:15.123"), "24 Dec 2024, 06:30:15 pm");
        assert_eq!(format_date("not a date"), "not a date");
        assert_eq!(format_date(""), "-");
    }
}

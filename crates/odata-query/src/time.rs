//! Timestamp normalization for catalogue queries.
//!
//! Callers hand the search layer loosely formatted timestamps. The archive
//! wants one canonical UTC instant form, so parsing walks a fixed list of
//! accepted formats from most to least precise and the first success wins.
//! Input that matches none of them is replaced by the supplied default
//! instant rather than rejected.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Canonical instant format sent to the archive.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.000Z";

/// Accepted input formats, most precise first.
const PARSERS: &[fn(&str) -> Option<NaiveDateTime>] =
    &[parse_seconds, parse_minutes, parse_hours, parse_date];

/// Normalize a loosely formatted timestamp to `YYYY-MM-DDTHH:MM:SS.000Z`.
///
/// Absent, empty, or unparsable input yields `default` in canonical form.
/// All interpretation is UTC; no timezone offset is read from the input.
pub fn normalize_datetime(raw: Option<&str>, default: DateTime<Utc>) -> String {
    let parsed = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| PARSERS.iter().find_map(|parse| parse(s)));

    match parsed {
        Some(instant) => instant.format(CANONICAL_FORMAT).to_string(),
        None => default.format(CANONICAL_FORMAT).to_string(),
    }
}

fn parse_seconds(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()
}

fn parse_minutes(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").ok()
}

// chrono will not stop at a bare hour, so pad the minutes on first.
fn parse_hours(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(&format!("{}:00", s), "%Y-%m-%d %H:%M").ok()
}

fn parse_date(s: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn default_instant() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 30, 45).unwrap()
    }

    #[test]
    fn test_full_precision() {
        assert_eq!(
            normalize_datetime(Some("2024-09-03 14:23:45"), default_instant()),
            "2024-09-03T14:23:45.000Z"
        );
    }

    #[test]
    fn test_minute_precision() {
        assert_eq!(
            normalize_datetime(Some("2024-09-03 14:23"), default_instant()),
            "2024-09-03T14:23:00.000Z"
        );
    }

    #[test]
    fn test_hour_precision() {
        assert_eq!(
            normalize_datetime(Some("2024-09-03 14"), default_instant()),
            "2024-09-03T14:00:00.000Z"
        );
    }

    #[test]
    fn test_date_only() {
        assert_eq!(
            normalize_datetime(Some("2024-09-03"), default_instant()),
            "2024-09-03T00:00:00.000Z"
        );
    }

    #[test]
    fn test_unparsable_uses_default() {
        assert_eq!(
            normalize_datetime(Some("not-a-date"), default_instant()),
            "2024-01-15T12:30:45.000Z"
        );
    }

    #[test]
    fn test_absent_uses_default() {
        assert_eq!(
            normalize_datetime(None, default_instant()),
            "2024-01-15T12:30:45.000Z"
        );
    }

    #[test]
    fn test_empty_uses_default() {
        assert_eq!(
            normalize_datetime(Some("   "), default_instant()),
            "2024-01-15T12:30:45.000Z"
        );
    }

    #[test]
    fn test_default_with_subsecond_part_stays_canonical() {
        let with_millis = default_instant() + chrono::Duration::milliseconds(789);
        assert_eq!(
            normalize_datetime(None, with_millis),
            "2024-01-15T12:30:45.000Z"
        );
    }

    #[test]
    fn test_input_is_trimmed() {
        assert_eq!(
            normalize_datetime(Some("  2024-09-03 14:23:45  "), default_instant()),
            "2024-09-03T14:23:45.000Z"
        );
    }
}

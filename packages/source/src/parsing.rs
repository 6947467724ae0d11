//! Shared parsing utilities for municipal data vintages.
//!
//! Row-level parse failures never raise: unparseable dates become `None`
//! and unusable counts become zero.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use road_risk_source_models::{RawRecord, field_f64, field_text};

/// Date-and-time layouts seen across open-data exports.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

/// Date-only layouts.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// A parsed timestamp and whether the source text carried a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedTimestamp {
    /// Wall-clock date and time (midnight for date-only values).
    pub datetime: NaiveDateTime,
    /// `false` when the source only had a date.
    pub has_time: bool,
}

/// Parses a timestamp in any of the supported layouts.
///
/// RFC 3339 values with an offset keep their local wall-clock time.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<ParsedTimestamp> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(ParsedTimestamp {
            datetime: dt.naive_local(),
            has_time: true,
        });
    }

    if let Some(datetime) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Some(ParsedTimestamp {
            datetime,
            has_time: true,
        });
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|date| ParsedTimestamp {
            datetime: date.and_time(chrono::NaiveTime::MIN),
            has_time: false,
        })
}

/// Parses a timestamp field, treating a missing or unparseable value as
/// `None`.
#[must_use]
pub fn timestamp_field(record: &RawRecord, field: &str) -> Option<ParsedTimestamp> {
    parse_timestamp(&field_text(record, field)?)
}

/// Reads an hour-of-day field. Values outside 0-23 are discarded.
#[must_use]
pub fn hour_field(record: &RawRecord, field: &str) -> Option<u32> {
    let hour = field_f64(record, field)?;
    if !(0.0..24.0).contains(&hour) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(hour as u32)
}

/// Trims and upper-cases a free-text categorical field. Empty values are
/// `None`.
#[must_use]
pub fn category_field(record: &RawRecord, field: &str) -> Option<String> {
    field_text(record, field).map(|s| s.to_uppercase())
}

/// Reads a count field, coercing missing or non-numeric values to zero.
#[must_use]
pub fn count_field(record: &RawRecord, field: &str) -> i64 {
    #[allow(clippy::cast_possible_truncation)]
    field_f64(record, field).map_or(0, |v| v as i64)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike as _, Timelike as _};

    use super::*;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn parses_iso_datetime_with_fractional() {
        let ts = parse_timestamp("2019-03-04T14:30:00.000").unwrap();
        assert_eq!(ts.datetime.to_string(), "2019-03-04 14:30:00");
        assert!(ts.has_time);
    }

    #[test]
    fn parses_rfc3339_keeping_wall_clock() {
        let ts = parse_timestamp("2019-12-31T23:15:00-05:00").unwrap();
        assert_eq!(ts.datetime.year(), 2019);
        assert_eq!(ts.datetime.hour(), 23);

        let zulu = parse_timestamp("2020-01-01T05:00:00Z").unwrap();
        assert_eq!(zulu.datetime.hour(), 5);
    }

    #[test]
    fn parses_date_only_values() {
        let ts = parse_timestamp("2021-07-09").unwrap();
        assert_eq!(ts.datetime.to_string(), "2021-07-09 00:00:00");
        assert!(!ts.has_time);

        let slash = parse_timestamp("07/09/2021").unwrap();
        assert_eq!(slash.datetime.date(), ts.datetime.date());
    }

    #[test]
    fn parses_us_datetime_with_meridiem() {
        let ts = parse_timestamp("07/09/2021 03:15:00 PM").unwrap();
        assert_eq!(ts.datetime.hour(), 15);
    }

    #[test]
    fn rejects_invalid_dates() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2021-13-45").is_none());
    }

    #[test]
    fn reads_hours() {
        let rec = record(serde_json::json!({"a": "14", "b": 23.0, "c": 24, "d": "x"}));
        assert_eq!(hour_field(&rec, "a"), Some(14));
        assert_eq!(hour_field(&rec, "b"), Some(23));
        assert_eq!(hour_field(&rec, "c"), None);
        assert_eq!(hour_field(&rec, "d"), None);
    }

    #[test]
    fn normalizes_categories() {
        let rec = record(serde_json::json!({"Light": "  Daylight ", "Blank": "  "}));
        assert_eq!(category_field(&rec, "Light").as_deref(), Some("DAYLIGHT"));
        assert_eq!(category_field(&rec, "Blank"), None);
        assert_eq!(category_field(&rec, "Missing"), None);
    }

    #[test]
    fn coerces_counts_to_zero() {
        let rec = record(serde_json::json!({"a": "2", "b": "", "c": null, "d": 3.0}));
        assert_eq!(count_field(&rec, "a"), 2);
        assert_eq!(count_field(&rec, "b"), 0);
        assert_eq!(count_field(&rec, "c"), 0);
        assert_eq!(count_field(&rec, "d"), 3);
        assert_eq!(count_field(&rec, "missing"), 0);
    }
}

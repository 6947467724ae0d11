#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Raw record type and the cleaned entities produced from municipal
//! open-data feeds.
//!
//! Raw rows arrive as loosely-typed JSON objects ([`RawRecord`]) whose
//! column names vary between data vintages. The cleaners turn them into
//! [`Collision`], [`RoadSegment`] and [`ConstructionEvent`] values; the
//! geometry for each entity travels alongside it in a geometric table
//! rather than inside the struct.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single source row, keyed by column name.
pub type RawRecord = serde_json::Map<String, Value>;

/// Returns the set of column names present across `records`.
///
/// Mirrors a table's column set: a column exists if any row carries it,
/// even when that row's value is `null`.
#[must_use]
pub fn column_set(records: &[RawRecord]) -> BTreeSet<String> {
    records
        .iter()
        .flat_map(|record| record.keys().cloned())
        .collect()
}

/// Gets a field as text. Numbers and booleans are rendered; `null`,
/// arrays and objects are treated as missing. Whitespace is trimmed and
/// empty strings are missing.
#[must_use]
pub fn field_text(record: &RawRecord, field: &str) -> Option<String> {
    let text = match record.get(field)? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => render_number(n),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    if text.is_empty() { None } else { Some(text) }
}

/// Gets a numeric field, accepting JSON numbers and numeric strings.
///
/// Returns `None` for missing, empty, non-numeric or non-finite values.
#[must_use]
pub fn field_f64(record: &RawRecord, field: &str) -> Option<f64> {
    let value = match record.get(field)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Renders a JSON number, dropping a zero fractional part so that `42.0`
/// and `42` produce the same identifier text.
fn render_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        #[allow(clippy::cast_possible_truncation)]
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => (f as i64).to_string(),
        _ => n.to_string(),
    }
}

/// Stable identifier of a road segment.
///
/// Integer identifiers order numerically and sort before any other text,
/// which orders lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SegmentId(pub String);

impl SegmentId {
    /// Reads a segment identifier from a record field.
    ///
    /// Numeric identifiers are rendered without a trailing `.0`.
    #[must_use]
    pub fn from_record(record: &RawRecord, field: &str) -> Option<Self> {
        field_text(record, field).map(Self)
    }

    /// Returns the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn as_integer(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl Ord for SegmentId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.as_integer(), other.as_integer()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for SegmentId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SegmentId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A traffic collision after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collision {
    /// Parsed accident timestamp. `None` when the source value could not
    /// be parsed.
    pub accident_date: Option<NaiveDateTime>,
    /// Calendar year of the accident.
    pub year: Option<i32>,
    /// Month of the accident (1-12).
    pub month: Option<u32>,
    /// Day of week, Monday = 0.
    pub day_of_week: Option<u32>,
    /// Hour of day (0-23).
    pub hour: Option<u32>,
    /// Light condition, trimmed and upper-cased.
    pub light: Option<String>,
    /// Traffic control type, trimmed and upper-cased.
    pub traffic_control: Option<String>,
    /// Collision classification, trimmed and upper-cased.
    pub classification: Option<String>,
    /// Number of fatalities. Zero when the source has no usable column.
    pub fatalities: i64,
    /// Number of injuries. Zero when the source has no usable column.
    pub injuries: i64,
}

/// A road centreline segment after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    /// Segment identifier.
    pub id: SegmentId,
    /// Segment length in meters.
    pub length_m: f64,
    /// Road subtype description.
    pub subtype_text: Option<String>,
    /// Road subclass.
    pub subclass: Option<String>,
    /// Owning authority.
    pub ownership: Option<String>,
    /// Traffic flow type (one-way, two-way, ...).
    pub flow: Option<String>,
    /// Grade separation indicator.
    pub grade_separated: Option<String>,
}

/// A planned or active construction project after cleaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionEvent {
    /// Targeted start of the work, when the source provides one.
    pub targeted_start: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(value: serde_json::Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn reads_numeric_strings() {
        let rec = record(serde_json::json!({"Long": " -75.7 ", "Lat": 45.4}));
        assert!((field_f64(&rec, "Long").unwrap() - -75.7).abs() < f64::EPSILON);
        assert!((field_f64(&rec, "Lat").unwrap() - 45.4).abs() < f64::EPSILON);
    }

    #[test]
    fn treats_blank_and_null_as_missing() {
        let rec = record(serde_json::json!({"a": "", "b": null, "c": "n/a"}));
        assert!(field_f64(&rec, "a").is_none());
        assert!(field_f64(&rec, "b").is_none());
        assert!(field_f64(&rec, "c").is_none());
        assert!(field_f64(&rec, "missing").is_none());
        assert!(field_text(&rec, "a").is_none());
        assert!(field_text(&rec, "b").is_none());
    }

    #[test]
    fn segment_ids_ignore_integral_float_suffix() {
        let rec = record(serde_json::json!({"a": 1234, "b": 1234.0, "c": "1234"}));
        let a = SegmentId::from_record(&rec, "a").unwrap();
        let b = SegmentId::from_record(&rec, "b").unwrap();
        let c = SegmentId::from_record(&rec, "c").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.as_str(), "1234");
    }

    #[test]
    fn integer_segment_ids_order_numerically() {
        let mut ids: Vec<SegmentId> = ["10", "9", "B", "100", "A"]
            .into_iter()
            .map(SegmentId::from)
            .collect();
        ids.sort();
        let ordered: Vec<&str> = ids.iter().map(SegmentId::as_str).collect();
        assert_eq!(ordered, vec!["9", "10", "100", "A", "B"]);
    }

    #[test]
    fn column_set_is_union_of_keys() {
        let records = vec![
            record(serde_json::json!({"a": 1})),
            record(serde_json::json!({"b": null})),
        ];
        let cols = column_set(&records);
        assert!(cols.contains("a"));
        assert!(cols.contains("b"));
        assert_eq!(cols.len(), 2);
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The segment-year feature record and its column contract.
//!
//! [`Column`] fixes the output column names and order. [`LEAKAGE_COLUMNS`]
//! lists the columns a model must never train on: the label and the
//! same-year outcome counts it is derived from.

use road_risk_source_models::SegmentId;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// One row of the feature table, keyed by (segment, year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentYearRecord {
    /// Road segment identifier.
    pub segment_id: SegmentId,
    /// Calendar year.
    pub year: i32,
    /// Collisions associated with the segment this year.
    pub collisions_total: i64,
    /// Fatalities summed over those collisions.
    pub fatal_major: i64,
    /// Injuries summed over those collisions.
    pub injuries_total: i64,
    /// Segment length in meters.
    pub length_m: f64,
    /// Road subtype description.
    pub subtype_text: Option<String>,
    /// Road subclass.
    pub subclass: Option<String>,
    /// Owning authority.
    pub ownership: Option<String>,
    /// Traffic flow type.
    pub flow: Option<String>,
    /// Grade separation indicator.
    pub grade_separated: Option<String>,
    /// Whether any construction project lies near the segment.
    pub construction_flag: bool,
    /// `collisions_total` of the segment's previous record, 0 for its first.
    pub collisions_prev_year: i64,
    /// `fatal_major` of the segment's previous record, 0 for its first.
    pub fatal_prev_year: i64,
    /// `injuries_total` of the segment's previous record, 0 for its first.
    pub injuries_prev_year: i64,
    /// Whether `collisions_total` reaches the year's high-risk threshold.
    pub high_risk: bool,
}

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// UTF-8 text, nullable.
    Text,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 64-bit float.
    Float64,
    /// Boolean stored as 0/1.
    Flag,
}

/// Output columns of the feature table, in order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Column {
    /// Road segment identifier
    SegmentId,
    /// Calendar year of the collisions
    Year,
    /// Collisions associated with the segment this year
    CollisionsTotal,
    /// Fatalities across this year's collisions
    FatalMajor,
    /// Injuries across this year's collisions
    InjuriesTotal,
    /// Segment length in meters
    LengthM,
    /// Road subtype (arterial, collector, local, ...)
    SubtypeText,
    /// Road subclass
    Subclass,
    /// Owning jurisdiction
    Ownership,
    /// One-way or two-way flow
    Flow,
    /// Grade separation indicator
    GradeSeparated,
    /// Whether any construction point lies near the segment
    ConstructionFlag,
    /// Collisions in the segment's previous observed year
    CollisionsPrevYear,
    /// Fatalities in the segment's previous observed year
    FatalPrevYear,
    /// Injuries in the segment's previous observed year
    InjuriesPrevYear,
    /// Collisions at or above the year's high-risk quantile
    HighRisk,
}

impl Column {
    /// All columns in output order.
    #[must_use]
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    /// How the column is stored.
    #[must_use]
    pub const fn column_type(self) -> ColumnType {
        match self {
            Self::SegmentId
            | Self::SubtypeText
            | Self::Subclass
            | Self::Ownership
            | Self::Flow
            | Self::GradeSeparated => ColumnType::Text,
            Self::Year => ColumnType::Int32,
            Self::CollisionsTotal
            | Self::FatalMajor
            | Self::InjuriesTotal
            | Self::CollisionsPrevYear
            | Self::FatalPrevYear
            | Self::InjuriesPrevYear => ColumnType::Int64,
            Self::LengthM => ColumnType::Float64,
            Self::ConstructionFlag | Self::HighRisk => ColumnType::Flag,
        }
    }

    /// Whether a model must exclude this column from its inputs.
    #[must_use]
    pub fn is_leakage(self) -> bool {
        LEAKAGE_COLUMNS.contains(&self)
    }
}

/// Columns that carry the label or same-year outcomes.
pub const LEAKAGE_COLUMNS: [Column; 4] = [
    Column::HighRisk,
    Column::CollisionsTotal,
    Column::FatalMajor,
    Column::InjuriesTotal,
];

/// Columns a model may train on: every output column except
/// [`LEAKAGE_COLUMNS`], in output order.
#[must_use]
pub fn model_feature_columns() -> Vec<Column> {
    Column::iter().filter(|c| !c.is_leakage()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_order_and_names() {
        let names: Vec<String> = Column::all().iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            vec![
                "segment_id",
                "year",
                "collisions_total",
                "fatal_major",
                "injuries_total",
                "length_m",
                "subtype_text",
                "subclass",
                "ownership",
                "flow",
                "grade_separated",
                "construction_flag",
                "collisions_prev_year",
                "fatal_prev_year",
                "injuries_prev_year",
                "high_risk",
            ]
        );
    }

    #[test]
    fn record_serializes_every_column() {
        let record = SegmentYearRecord {
            segment_id: SegmentId::from("7"),
            year: 2020,
            collisions_total: 3,
            fatal_major: 0,
            injuries_total: 1,
            length_m: 12.5,
            subtype_text: None,
            subclass: Some("ARTERIAL".to_string()),
            ownership: None,
            flow: None,
            grade_separated: None,
            construction_flag: false,
            collisions_prev_year: 0,
            fatal_prev_year: 0,
            injuries_prev_year: 0,
            high_risk: true,
        };
        let value = serde_json::to_value(&record).unwrap();
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        let mut expected: Vec<String> = Column::all().iter().map(ToString::to_string).collect();
        keys.sort();
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(value["segment_id"], "7");
    }

    #[test]
    fn leakage_columns_are_excluded_from_features() {
        let features = model_feature_columns();
        for column in LEAKAGE_COLUMNS {
            assert!(!features.contains(&column), "{column} leaked");
        }
        assert_eq!(features.len() + LEAKAGE_COLUMNS.len(), Column::all().len());
        assert!(features.contains(&Column::CollisionsPrevYear));
        assert_eq!(features[0], Column::SegmentId);
    }

    #[test]
    fn parses_column_names() {
        assert_eq!("high_risk".parse::<Column>().unwrap(), Column::HighRisk);
        assert!("unknown".parse::<Column>().is_err());
    }
}

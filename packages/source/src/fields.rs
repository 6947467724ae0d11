//! Declarative field maps for each source type.
//!
//! Column names drift between data vintages. Each target field lists its
//! acceptable source names in priority order, and [`resolve_column`] picks
//! the first one present. The defaults match the Ottawa open-data exports;
//! every map can be overridden from configuration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Picks the first candidate present in `columns`.
#[must_use]
pub fn resolve_column<'a>(columns: &BTreeSet<String>, candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .find(|c| columns.contains(c.as_str()))
        .map(String::as_str)
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(ToString::to_string).collect()
}

/// Source columns for collision records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionFields {
    /// Accident date (and possibly time).
    pub date: String,
    /// Hour of day, 0-23.
    pub hour: String,
    /// Longitude in the geographic frame.
    pub longitude: String,
    /// Latitude in the geographic frame.
    pub latitude: String,
    /// Light condition.
    pub light: String,
    /// Traffic control type.
    pub traffic_control: String,
    /// Collision classification.
    pub classification: String,
    /// Candidate fatality count columns, highest priority first.
    pub fatalities: Vec<String>,
    /// Candidate injury count columns, highest priority first.
    pub injuries: Vec<String>,
}

impl Default for CollisionFields {
    fn default() -> Self {
        Self {
            date: "Accident_Date".to_string(),
            hour: "Hour".to_string(),
            longitude: "Long".to_string(),
            latitude: "Lat".to_string(),
            light: "Light".to_string(),
            traffic_control: "Traffic_Control".to_string(),
            classification: "Classification_Of_Accident".to_string(),
            fatalities: names(&["num_of_fatal", "Fatalities", "NUM_FATAL", "Fatal"]),
            injuries: names(&[
                "num_of_injuries",
                "Injuries",
                "NUM_INJURIES",
                "Injury_Count",
                "Injuries_Total",
            ]),
        }
    }
}

/// A truncated source column and its canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    /// Name as it appears in the source.
    pub from: String,
    /// Canonical name.
    pub to: String,
}

/// Source columns for road centreline records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadFields {
    /// Segment identifier.
    pub id: String,
    /// Well-known-text geometry column for tabular input.
    pub geometry: String,
    /// Length in meters reported by the source.
    pub length: String,
    /// Road subtype description.
    pub subtype_text: String,
    /// Road subclass.
    pub subclass: String,
    /// Ownership.
    pub ownership: String,
    /// Flow type (one-way, two-way).
    pub flow: String,
    /// Grade separation.
    pub grade_separated: String,
    /// Truncated names rewritten before any lookup. A rename applies only
    /// when the canonical column is absent.
    pub renames: Vec<Rename>,
}

impl Default for RoadFields {
    fn default() -> Self {
        let rename = |from: &str, to: &str| Rename {
            from: from.to_string(),
            to: to.to_string(),
        };
        Self {
            id: "RD_SEGMENT_ID".to_string(),
            geometry: "geometry".to_string(),
            length: "SHAPE_Length".to_string(),
            subtype_text: "SUBTYPE_TEXT".to_string(),
            subclass: "SUBCLASS".to_string(),
            ownership: "OWNERSHIP".to_string(),
            flow: "FLOW".to_string(),
            grade_separated: "GRADE_SEPARATED".to_string(),
            renames: vec![
                rename("RD_SEGMENT", "RD_SEGMENT_ID"),
                rename("SHAPE_Leng", "SHAPE_Length"),
                rename("SUBTYPE_TE", "SUBTYPE_TEXT"),
                rename("GRADE_SEPA", "GRADE_SEPARATED"),
            ],
        }
    }
}

/// Source columns for construction records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstructionFields {
    /// Planned start date.
    pub start_date: String,
    /// Candidate longitude (X) columns.
    pub longitude: Vec<String>,
    /// Candidate latitude (Y) columns.
    pub latitude: Vec<String>,
}

impl Default for ConstructionFields {
    fn default() -> Self {
        Self {
            start_date: "TARGETED_START".to_string(),
            longitude: names(&["X", "Longitude", "LONG", "lon"]),
            latitude: names(&["Y", "Latitude", "LAT", "lat"]),
        }
    }
}

/// Field maps for every source type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMaps {
    /// Collision columns.
    pub collisions: CollisionFields,
    /// Road centreline columns.
    pub roads: RoadFields,
    /// Construction columns.
    pub construction: ConstructionFields,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn resolves_first_present_candidate() {
        let fields = CollisionFields::default();
        let cols = columns(&["Fatal", "NUM_FATAL", "Lat"]);
        assert_eq!(resolve_column(&cols, &fields.fatalities), Some("NUM_FATAL"));
    }

    #[test]
    fn canonical_name_wins() {
        let fields = CollisionFields::default();
        let cols = columns(&["Injuries_Total", "num_of_injuries"]);
        assert_eq!(
            resolve_column(&cols, &fields.injuries),
            Some("num_of_injuries")
        );
    }

    #[test]
    fn unresolved_when_no_candidate_present() {
        let fields = ConstructionFields::default();
        assert_eq!(resolve_column(&columns(&["Easting"]), &fields.longitude), None);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let maps: FieldMaps = toml::from_str(
            r#"
            [collisions]
            longitude = "LONGITUDE"

            [construction]
            latitude = ["NORTHING"]
            "#,
        )
        .unwrap();
        assert_eq!(maps.collisions.longitude, "LONGITUDE");
        assert_eq!(maps.collisions.latitude, "Lat");
        assert_eq!(maps.construction.latitude, vec!["NORTHING".to_string()]);
        assert_eq!(maps.construction.longitude.len(), 4);
        assert_eq!(maps.roads, RoadFields::default());
    }
}

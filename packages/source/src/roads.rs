//! Road centreline cleaner.

use std::collections::BTreeSet;

use geo::{Euclidean, Geometry, Length as _, MultiLineString};
use road_risk_source_models::{RawRecord, RoadSegment, SegmentId, column_set, field_f64, field_text};
use road_risk_spatial::{Frames, GeoRow, GeoTable, reproject};
use wkt::TryFromWkt as _;

use crate::CleanError;
use crate::fields::RoadFields;

/// Road input in either accepted shape.
#[derive(Debug, Clone)]
pub enum RoadInput {
    /// Rows that already carry a geometry, e.g. from a `GeoJSON` reader.
    Geometric(GeoTable<RawRecord, Geometry<f64>>),
    /// Plain rows with a well-known-text geometry column.
    Tabular(Vec<RawRecord>),
}

/// Cleans road centrelines into projected multi-linestrings.
///
/// Truncated column names are restored first. Input with no declared frame
/// is assumed geographic. Rows with no identifier, or with a geometry that
/// is missing, unparseable or not linear, are dropped with a warning.
/// Length comes from the reported length column when a row has one and is
/// otherwise measured on the projected geometry.
///
/// # Errors
///
/// * [`CleanError::MissingGeometry`] if tabular input has no geometry
///   column.
/// * [`CleanError::Spatial`] if reprojection fails.
pub fn clean_roads(
    input: RoadInput,
    fields: &RoadFields,
    frames: &Frames,
) -> Result<GeoTable<RoadSegment, MultiLineString<f64>>, CleanError> {
    let geometric = match input {
        RoadInput::Geometric(table) => table,
        RoadInput::Tabular(records) => parse_wkt_column(records, fields)?,
    };
    let total = geometric.len();

    let columns: BTreeSet<&str> = geometric
        .iter()
        .flat_map(|row| row.attributes.keys().map(String::as_str))
        .collect();
    let renames: Vec<(String, String)> = fields
        .renames
        .iter()
        .filter(|r| columns.contains(r.from.as_str()) && !columns.contains(r.to.as_str()))
        .map(|r| (r.from.clone(), r.to.clone()))
        .collect();
    for (from, to) in &renames {
        log::debug!("Renaming road column {from} -> {to}");
    }

    let mut non_linear = 0usize;
    let linear = geometric.filter_map_rows(|row| {
        if let Some(lines) = to_multi_line_string(row.geometry) {
            Some(GeoRow::new(row.attributes, lines))
        } else {
            non_linear += 1;
            None
        }
    });
    if non_linear > 0 {
        log::warn!("Dropped {non_linear} road rows with non-linear geometry");
    }

    let projected = reproject(
        linear.with_default_crs(frames.geographic),
        frames.projected,
    )?;

    let mut missing_id = 0usize;
    let cleaned = projected.filter_map_rows(|row| {
        let mut record = row.attributes;
        for (from, to) in &renames {
            if let Some(value) = record.remove(from) {
                record.insert(to.clone(), value);
            }
        }

        let Some(id) = SegmentId::from_record(&record, &fields.id) else {
            missing_id += 1;
            return None;
        };
        let length_m = field_f64(&record, &fields.length)
            .unwrap_or_else(|| Euclidean.length(&row.geometry));

        Some(GeoRow::new(
            RoadSegment {
                id,
                length_m,
                subtype_text: field_text(&record, &fields.subtype_text),
                subclass: field_text(&record, &fields.subclass),
                ownership: field_text(&record, &fields.ownership),
                flow: field_text(&record, &fields.flow),
                grade_separated: field_text(&record, &fields.grade_separated),
            },
            row.geometry,
        ))
    });
    if missing_id > 0 {
        log::warn!("Dropped {missing_id} road rows without {}", fields.id);
    }

    log::info!("Cleaned {} of {total} road segments", cleaned.len());
    Ok(cleaned)
}

fn parse_wkt_column(
    records: Vec<RawRecord>,
    fields: &RoadFields,
) -> Result<GeoTable<RawRecord, Geometry<f64>>, CleanError> {
    if !column_set(&records).contains(&fields.geometry) {
        return Err(CleanError::MissingGeometry {
            field: fields.geometry.clone(),
        });
    }

    let total = records.len();
    let rows: Vec<_> = records
        .into_iter()
        .filter_map(|mut record| {
            let text = field_text(&record, &fields.geometry)?;
            match Geometry::<f64>::try_from_wkt_str(&text) {
                Ok(geometry) => {
                    record.remove(&fields.geometry);
                    Some(GeoRow::new(record, geometry))
                }
                Err(e) => {
                    log::debug!("Unparseable road WKT: {e}");
                    None
                }
            }
        })
        .collect();

    let dropped = total - rows.len();
    if dropped > 0 {
        log::warn!("Dropped {dropped} road rows with missing or unparseable {}", fields.geometry);
    }

    Ok(GeoTable::new(None, rows))
}

fn to_multi_line_string(geometry: Geometry<f64>) -> Option<MultiLineString<f64>> {
    match geometry {
        Geometry::LineString(line) => Some(MultiLineString::new(vec![line])),
        Geometry::MultiLineString(lines) => Some(lines),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use geo::{Point, line_string};
    use road_risk_spatial::Crs;

    use super::*;

    fn records(value: serde_json::Value) -> Vec<RawRecord> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn clean(input: RoadInput) -> GeoTable<RoadSegment, MultiLineString<f64>> {
        clean_roads(input, &RoadFields::default(), &Frames::default()).unwrap()
    }

    #[test]
    fn wkt_without_frame_ends_projected() {
        let table = clean(RoadInput::Tabular(records(serde_json::json!([
            {"RD_SEGMENT_ID": 1, "geometry": "LINESTRING (-75.70 45.40, -75.69 45.40)"},
        ]))));
        assert_eq!(table.len(), 1);
        assert_eq!(table.crs(), Some(Crs::NAD83_UTM_18N));

        let start = table.rows()[0].geometry.0[0].0[0];
        assert!(start.x > 400_000.0 && start.x < 500_000.0, "x {}", start.x);
        assert!(start.y > 5_000_000.0, "y {}", start.y);
    }

    #[test]
    fn geometric_length_when_not_reported() {
        let table = clean(RoadInput::Tabular(records(serde_json::json!([
            {"RD_SEGMENT_ID": "A", "geometry": "LINESTRING (-75.70 45.40, -75.69 45.40)"},
        ]))));
        let length = table.rows()[0].attributes.length_m;
        assert!(length > 770.0 && length < 790.0, "length {length}");
    }

    #[test]
    fn reported_length_wins_with_per_row_fallback() {
        let table = clean(RoadInput::Tabular(records(serde_json::json!([
            {"RD_SEGMENT_ID": "A", "SHAPE_Length": 123.5, "geometry": "LINESTRING (-75.70 45.40, -75.69 45.40)"},
            {"RD_SEGMENT_ID": "B", "SHAPE_Length": null, "geometry": "LINESTRING (-75.70 45.40, -75.69 45.40)"},
        ]))));
        assert!((table.rows()[0].attributes.length_m - 123.5).abs() < 1e-9);
        assert!(table.rows()[1].attributes.length_m > 770.0);
    }

    #[test]
    fn restores_truncated_column_names() {
        let table = clean(RoadInput::Tabular(records(serde_json::json!([{
            "RD_SEGMENT": 42.0,
            "SHAPE_Leng": "10.0",
            "SUBTYPE_TE": "Arterial",
            "GRADE_SEPA": "N",
            "FLOW": "Two-Way",
            "geometry": "MULTILINESTRING ((-75.70 45.40, -75.69 45.40))",
        }]))));
        let seg = &table.rows()[0].attributes;
        assert_eq!(seg.id.as_str(), "42");
        assert!((seg.length_m - 10.0).abs() < 1e-9);
        assert_eq!(seg.subtype_text.as_deref(), Some("Arterial"));
        assert_eq!(seg.grade_separated.as_deref(), Some("N"));
        assert_eq!(seg.flow.as_deref(), Some("Two-Way"));
        assert_eq!(seg.ownership, None);
    }

    #[test]
    fn canonical_column_blocks_rename() {
        let table = clean(RoadInput::Tabular(records(serde_json::json!([{
            "RD_SEGMENT_ID": "canonical",
            "RD_SEGMENT": "truncated",
            "geometry": "LINESTRING (-75.70 45.40, -75.69 45.40)",
        }]))));
        assert_eq!(table.rows()[0].attributes.id.as_str(), "canonical");
    }

    #[test]
    fn missing_geometry_column_is_fatal() {
        let err = clean_roads(
            RoadInput::Tabular(records(serde_json::json!([{"RD_SEGMENT_ID": 1}]))),
            &RoadFields::default(),
            &Frames::default(),
        )
        .unwrap_err();
        assert!(matches!(err, CleanError::MissingGeometry { .. }));
    }

    #[test]
    fn drops_bad_rows() {
        let table = clean(RoadInput::Tabular(records(serde_json::json!([
            {"RD_SEGMENT_ID": 1, "geometry": "LINESTRING (-75.70 45.40, -75.69 45.40)"},
            {"RD_SEGMENT_ID": 2, "geometry": "not wkt"},
            {"RD_SEGMENT_ID": 3, "geometry": "POINT (-75.70 45.40)"},
            {"RD_SEGMENT_ID": 4, "geometry": null},
            {"geometry": "LINESTRING (-75.70 45.40, -75.69 45.40)"},
        ]))));
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].attributes.id.as_str(), "1");
    }

    #[test]
    fn accepts_already_projected_geometric_input() {
        let mut record = RawRecord::new();
        record.insert("RD_SEGMENT_ID".to_string(), serde_json::json!("P"));
        let line: Geometry<f64> = line_string![(x: 0.0, y: 0.0), (x: 3.0, y: 4.0)].into();
        let input = GeoTable::new(Some(Crs::NAD83_UTM_18N), vec![GeoRow::new(record, line)]);

        let table = clean(RoadInput::Geometric(input));
        assert_eq!(table.rows()[0].geometry.0[0].0[1], geo::coord! { x: 3.0, y: 4.0 });
        assert!((table.rows()[0].attributes.length_m - 5.0).abs() < 1e-9);

        let point: Geometry<f64> = Point::new(0.0, 0.0).into();
        let only_point = GeoTable::new(
            Some(Crs::NAD83_UTM_18N),
            vec![GeoRow::new(RawRecord::new(), point)],
        );
        assert!(clean(RoadInput::Geometric(only_point)).is_empty());
    }
}

//! Input file readers.
//!
//! CSV rows become [`RawRecord`]s of trimmed string values; the cleaners
//! parse numbers and dates out of them. `GeoJSON` road files keep their
//! geometries and carry feature properties as the record.

use std::path::Path;

use geojson::{FeatureCollection, GeoJson};
use road_risk_source::RoadInput;
use road_risk_source_models::RawRecord;
use road_risk_spatial::{Crs, GeoRow, GeoTable};
use serde_json::Value;

use crate::PipelineError;

/// Reads a CSV file with a header row into raw records.
///
/// Short rows are padded with empty strings. A UTF-8 byte order mark on
/// the first header is stripped.
///
/// # Errors
///
/// Returns [`PipelineError::Csv`] if the file cannot be opened or parsed.
pub fn read_csv_records(path: &Path) -> Result<Vec<RawRecord>, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_owned())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let mut map = RawRecord::new();
        for (i, header) in headers.iter().enumerate() {
            let value = row.get(i).unwrap_or("").trim().to_owned();
            map.insert(header.clone(), Value::String(value));
        }
        records.push(map);
    }

    log::info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Reads road centrelines, choosing the format from the file extension.
///
/// `.geojson` and `.json` files are read as a `GeoJSON` feature
/// collection; anything else as CSV with a WKT column.
///
/// # Errors
///
/// Returns a [`PipelineError`] if the file cannot be read or parsed.
pub fn read_roads(path: &Path) -> Result<RoadInput, PipelineError> {
    let is_geojson = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("geojson") || ext.eq_ignore_ascii_case("json"));

    if is_geojson {
        let text = std::fs::read_to_string(path)?;
        Ok(RoadInput::Geometric(parse_geojson_roads(&text)?))
    } else {
        Ok(RoadInput::Tabular(read_csv_records(path)?))
    }
}

/// Parses a `GeoJSON` feature collection into a geometric table.
///
/// Features without a geometry, or whose geometry cannot be converted,
/// are dropped. The table's frame is taken from a legacy `crs` member
/// when present and left undeclared otherwise.
///
/// # Errors
///
/// * [`PipelineError::GeoJson`] if the text is not a feature collection.
/// * [`PipelineError::Spatial`] if the declared frame is unsupported.
pub fn parse_geojson_roads(text: &str) -> Result<GeoTable<RawRecord, geo::Geometry<f64>>, PipelineError> {
    let collection = FeatureCollection::try_from(text.parse::<GeoJson>()?)?;
    let crs = declared_crs(&collection)?;
    let total = collection.features.len();

    let rows: Vec<_> = collection
        .features
        .into_iter()
        .filter_map(|feature| {
            match geo::Geometry::<f64>::try_from(feature.geometry?) {
                Ok(geometry) => Some(GeoRow::new(feature.properties.unwrap_or_default(), geometry)),
                Err(e) => {
                    log::debug!("Skipping road feature: {e}");
                    None
                }
            }
        })
        .collect();

    if rows.len() < total {
        log::warn!("Dropped {} of {total} road features without usable geometry", total - rows.len());
    }

    Ok(GeoTable::new(crs, rows))
}

/// Reads the frame named by a legacy `"crs": {"properties": {"name": ..}}`
/// member.
fn declared_crs(collection: &FeatureCollection) -> Result<Option<Crs>, PipelineError> {
    let Some(name) = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.pointer("/properties/name"))
        .and_then(Value::as_str)
    else {
        return Ok(None);
    };

    if name.ends_with("CRS84") {
        return Ok(Some(Crs::WGS84));
    }
    // "urn:ogc:def:crs:EPSG::26918" or "EPSG:26918"
    let code = name.rsplit(':').next().unwrap_or(name);
    Ok(Some(code.parse::<Crs>()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_csv_as_trimmed_strings() {
        let path = std::env::temp_dir().join("road_risk_read_csv_test.csv");
        std::fs::write(
            &path,
            "\u{feff}Accident_Date, Long ,Lat\n2020-01-01, -75.7 ,45.4\n2020-01-02,-75.8\n",
        )
        .unwrap();

        let records = read_csv_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["Accident_Date"], "2020-01-01");
        assert_eq!(records[0]["Long"], "-75.7");
        assert_eq!(records[1]["Lat"], "");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn parses_geojson_features() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"RD_SEGMENT_ID": 7, "FLOW": "One-Way"},
                    "geometry": {"type": "LineString", "coordinates": [[-75.7, 45.4], [-75.69, 45.4]]}
                },
                {"type": "Feature", "properties": {"RD_SEGMENT_ID": 8}, "geometry": null}
            ]
        }"#;
        let table = parse_geojson_roads(text).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.crs(), None);
        assert_eq!(table.rows()[0].attributes["FLOW"], "One-Way");
        assert!(matches!(table.rows()[0].geometry, geo::Geometry::LineString(_)));
    }

    #[test]
    fn honours_legacy_crs_member() {
        let text = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::26918"}},
            "features": []
        }"#;
        let table = parse_geojson_roads(text).unwrap();
        assert_eq!(table.crs(), Some(Crs::NAD83_UTM_18N));

        let crs84 = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:OGC:1.3:CRS84"}},
            "features": []
        }"#;
        assert_eq!(parse_geojson_roads(crs84).unwrap().crs(), Some(Crs::WGS84));
    }

    #[test]
    fn rejects_unsupported_crs() {
        let text = r#"{
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "EPSG:3857"}},
            "features": []
        }"#;
        assert!(matches!(
            parse_geojson_roads(text),
            Err(PipelineError::Spatial(_))
        ));
    }
}

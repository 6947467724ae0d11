//! Construction project cleaner.

use geo::Point;
use road_risk_source_models::{ConstructionEvent, RawRecord, column_set};
use road_risk_spatial::{Frames, GeoTable, points_from_coordinates, reproject};

use crate::CleanError;
use crate::fields::{ConstructionFields, resolve_column};
use crate::parsing::timestamp_field;

/// Cleans construction records into projected points.
///
/// # Errors
///
/// * [`CleanError::MissingCoordinates`] if no longitude or no latitude
///   candidate column is present.
/// * [`CleanError::Spatial`] if reprojection fails.
pub fn clean_construction(
    records: &[RawRecord],
    fields: &ConstructionFields,
    frames: &Frames,
) -> Result<GeoTable<ConstructionEvent, Point<f64>>, CleanError> {
    let columns = column_set(records);
    let (Some(lon), Some(lat)) = (
        resolve_column(&columns, &fields.longitude),
        resolve_column(&columns, &fields.latitude),
    ) else {
        return Err(CleanError::MissingCoordinates {
            longitude: fields.longitude.clone(),
            latitude: fields.latitude.clone(),
        });
    };
    log::debug!("Construction coordinates from {lon}/{lat}");

    let has_start = columns.contains(&fields.start_date);
    let events = points_from_coordinates(records, lon, lat, frames.geographic).map_attributes(
        |record| ConstructionEvent {
            targeted_start: if has_start {
                timestamp_field(&record, &fields.start_date).map(|ts| ts.datetime)
            } else {
                None
            },
        },
    );

    let projected = reproject(events, frames.projected)?;
    log::info!(
        "Cleaned {} of {} construction records",
        projected.len(),
        records.len()
    );
    Ok(projected)
}

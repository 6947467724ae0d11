//! Point construction from coordinate columns.

use geo::Point;
use road_risk_source_models::{RawRecord, field_f64};

use crate::crs::Crs;
use crate::table::{GeoRow, GeoTable};

/// Builds one point per record from two numeric fields.
///
/// Records where either coordinate is missing or non-numeric are dropped,
/// so the output has `records.len()` minus the number of such records.
/// Kept records are cloned in input order.
#[must_use]
pub fn points_from_coordinates(
    records: &[RawRecord],
    lon_field: &str,
    lat_field: &str,
    crs: Crs,
) -> GeoTable<RawRecord, Point<f64>> {
    let rows: Vec<_> = records
        .iter()
        .filter_map(|record| {
            let lon = field_f64(record, lon_field)?;
            let lat = field_f64(record, lat_field)?;
            Some(GeoRow::new(record.clone(), Point::new(lon, lat)))
        })
        .collect();

    let dropped = records.len() - rows.len();
    if dropped > 0 {
        log::debug!(
            "Dropped {dropped} of {} records missing {lon_field}/{lat_field}",
            records.len()
        );
    }

    GeoTable::new(Some(crs), rows)
}

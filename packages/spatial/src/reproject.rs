//! Reprojection of whole tables between reference frames.

use geo::MapCoords;

use crate::SpatialError;
use crate::crs::Crs;
use crate::projection;
use crate::table::GeoTable;

/// Transforms every geometry in `table` to `target`.
///
/// Returns the table unchanged when it is already in `target`.
///
/// # Errors
///
/// Returns [`SpatialError::MissingReferenceFrame`] if the table has no
/// declared frame.
pub fn reproject<T, G>(table: GeoTable<T, G>, target: Crs) -> Result<GeoTable<T, G>, SpatialError>
where
    G: MapCoords<f64, f64, Output = G>,
{
    let Some(source) = table.crs() else {
        return Err(SpatialError::MissingReferenceFrame { target });
    };
    if source == target {
        return Ok(table);
    }

    log::debug!("Reprojecting {} rows from {source} to {target}", table.len());

    let rows = table
        .into_rows()
        .into_iter()
        .map(|mut row| {
            row.geometry = row
                .geometry
                .map_coords(|c| projection::transform(c, source, target));
            row
        })
        .collect();

    Ok(GeoTable::new(Some(target), rows))
}

//! Collision cleaner.

use chrono::{Datelike as _, Timelike as _};
use geo::Point;
use road_risk_source_models::{Collision, RawRecord, column_set};
use road_risk_spatial::{Frames, GeoTable, points_from_coordinates, reproject};

use crate::CleanError;
use crate::fields::{CollisionFields, resolve_column};
use crate::parsing::{category_field, count_field, hour_field, timestamp_field};

/// Cleans raw collision rows into projected points.
///
/// Dates that fail to parse leave every derived date field empty. Severity
/// columns are resolved once from the candidate lists; when none is
/// present the count is zero for every row. Rows without both coordinates
/// are dropped.
///
/// # Errors
///
/// Returns [`CleanError::Spatial`] if reprojection fails.
pub fn clean_collisions(
    records: &[RawRecord],
    fields: &CollisionFields,
    frames: &Frames,
) -> Result<GeoTable<Collision, Point<f64>>, CleanError> {
    let columns = column_set(records);
    let fatal_col = resolve_column(&columns, &fields.fatalities);
    let injury_col = resolve_column(&columns, &fields.injuries);

    if fatal_col.is_none() {
        log::debug!("No fatality column found; defaulting fatalities to 0");
    }
    if injury_col.is_none() {
        log::debug!("No injury column found; defaulting injuries to 0");
    }

    let points = points_from_coordinates(
        records,
        &fields.longitude,
        &fields.latitude,
        frames.geographic,
    );

    let cleaned = points.map_attributes(|record| {
        normalize(&record, fields, fatal_col, injury_col)
    });

    let unparsed = cleaned
        .iter()
        .filter(|row| row.attributes.accident_date.is_none())
        .count();
    if unparsed > 0 {
        log::warn!("{unparsed} collisions have no parseable {}", fields.date);
    }

    let projected = reproject(cleaned, frames.projected)?;
    log::info!(
        "Cleaned {} of {} collision records",
        projected.len(),
        records.len()
    );
    Ok(projected)
}

fn normalize(
    record: &RawRecord,
    fields: &CollisionFields,
    fatal_col: Option<&str>,
    injury_col: Option<&str>,
) -> Collision {
    let timestamp = timestamp_field(record, &fields.date);
    let date = timestamp.map(|ts| ts.datetime);

    let hour = hour_field(record, &fields.hour).or_else(|| {
        timestamp
            .filter(|ts| ts.has_time)
            .map(|ts| ts.datetime.hour())
    });

    Collision {
        accident_date: date,
        year: date.map(|d| d.year()),
        month: date.map(|d| d.month()),
        day_of_week: date.map(|d| d.weekday().num_days_from_monday()),
        hour,
        light: category_field(record, &fields.light),
        traffic_control: category_field(record, &fields.traffic_control),
        classification: category_field(record, &fields.classification),
        fatalities: fatal_col.map_or(0, |col| count_field(record, col)),
        injuries: injury_col.map_or(0, |col| count_field(record, col)),
    }
}

//! Spatial association of events with road segments.

use std::collections::BTreeSet;

use geo::{MultiLineString, Point};
use road_risk_source_models::{RoadSegment, SegmentId};
use road_risk_spatial::{AssociationTable, GeoTable, JoinMode, buffered_intersection_join};

use crate::FeatureError;

/// Associates each event with every segment within `buffer_m`.
///
/// The segment side is narrowed to the key returned by `segment_key` before
/// joining, so no other segment attribute reaches the result. Joins in
/// [`JoinMode::Left`]: unassociated events stay in the output with no key.
///
/// # Errors
///
/// Returns [`FeatureError::Spatial`] if the tables' frames differ.
pub fn associate_events_to_segments<T, S, K>(
    events: &GeoTable<T, Point<f64>>,
    segments: &GeoTable<S, MultiLineString<f64>>,
    segment_key: impl FnMut(&S) -> K,
    buffer_m: f64,
) -> Result<AssociationTable<T, K>, FeatureError>
where
    T: Clone,
    K: Clone,
{
    let keys = segments.select(segment_key);
    let joined = buffered_intersection_join(events, &keys, buffer_m, JoinMode::Left)?;

    let matched = joined.iter().filter(|r| r.attributes.line.is_some()).count();
    log::info!(
        "Associated {} events with segments: {matched} matches, {} unassociated",
        events.len(),
        joined.len() - matched
    );
    Ok(joined)
}

/// Segments with at least one point within `margin_m`.
///
/// # Errors
///
/// Returns [`FeatureError::Spatial`] if the tables' frames differ.
pub fn construction_flags<T: Clone>(
    construction: &GeoTable<T, Point<f64>>,
    segments: &GeoTable<RoadSegment, MultiLineString<f64>>,
    margin_m: f64,
) -> Result<BTreeSet<SegmentId>, FeatureError> {
    let keys = segments.select(|s| s.id.clone());
    let joined = buffered_intersection_join(construction, &keys, margin_m, JoinMode::Inner)?;

    let flagged: BTreeSet<SegmentId> = joined
        .into_rows()
        .into_iter()
        .filter_map(|row| row.attributes.line)
        .collect();
    log::info!(
        "{} of {} segments flagged for construction",
        flagged.len(),
        segments.len()
    );
    Ok(flagged)
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Segment-year feature engineering.
//!
//! Associates cleaned collisions with road segments, groups them by
//! (segment, year), merges static segment attributes and a construction
//! flag, adds one-period lag features and labels each year's top quantile
//! of segments as high-risk.

pub mod aggregate;
pub mod associate;

pub use associate::{associate_events_to_segments, construction_flags};

use std::collections::BTreeSet;

use geo::{MultiLineString, Point};
use road_risk_features_models::SegmentYearRecord;
use road_risk_source_models::{Collision, ConstructionEvent, RoadSegment};
use road_risk_spatial::{GeoTable, SpatialError};
use serde::{Deserialize, Serialize};

/// Errors that abort feature building.
#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    /// A geometry operation failed.
    #[error("Spatial error: {0}")]
    Spatial(#[from] SpatialError),

    /// The high-risk quantile is outside `[0, 1]`.
    #[error("High-risk quantile must be within [0, 1], got {0}")]
    InvalidQuantile(f64),
}

/// Tunables for [`build_feature_table`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Collision-to-segment association distance in meters.
    pub buffer_m: f64,
    /// Construction-to-segment distance in meters.
    pub construction_margin_m: f64,
    /// Per-year quantile of collision totals at which a segment-year is
    /// labeled high-risk.
    pub high_risk_quantile: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            buffer_m: 12.0,
            construction_margin_m: 20.0,
            high_risk_quantile: 0.8,
        }
    }
}

/// Builds the labeled segment-year table.
///
/// Only segment-years with at least one associated collision appear.
/// Records come out sorted by (segment, year). Without construction input
/// every construction flag is `false`.
///
/// # Errors
///
/// * [`FeatureError::InvalidQuantile`] if the configured quantile is
///   outside `[0, 1]`.
/// * [`FeatureError::Spatial`] if the inputs' frames differ.
pub fn build_feature_table(
    collisions: &GeoTable<Collision, Point<f64>>,
    segments: &GeoTable<RoadSegment, MultiLineString<f64>>,
    construction: Option<&GeoTable<ConstructionEvent, Point<f64>>>,
    config: &FeatureConfig,
) -> Result<Vec<SegmentYearRecord>, FeatureError> {
    let q = config.high_risk_quantile;
    if !(0.0..=1.0).contains(&q) {
        return Err(FeatureError::InvalidQuantile(q));
    }

    let associations =
        associate_events_to_segments(collisions, segments, |s| s.id.clone(), config.buffer_m)?;

    let flagged = match construction {
        Some(events) => construction_flags(events, segments, config.construction_margin_m)?,
        None => BTreeSet::new(),
    };

    let groups = aggregate::group_segment_years(&associations);
    let mut records = aggregate::merge_segment_attributes(
        groups,
        segments.iter().map(|row| &row.attributes),
        &flagged,
    );
    aggregate::apply_lags(&mut records);
    aggregate::apply_labels(&mut records, q);

    let high_risk = records.iter().filter(|r| r.high_risk).count();
    log::info!(
        "Built {} segment-year records ({high_risk} high-risk)",
        records.len()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use geo::line_string;
    use road_risk_source_models::SegmentId;
    use road_risk_spatial::{Crs, GeoRow};

    use super::*;

    fn collision(year: i32, injuries: i64) -> Collision {
        Collision {
            accident_date: None,
            year: Some(year),
            month: None,
            day_of_week: None,
            hour: None,
            light: None,
            traffic_control: None,
            classification: None,
            fatalities: 0,
            injuries,
        }
    }

    fn roads(ids: &[&str]) -> GeoTable<RoadSegment, MultiLineString<f64>> {
        let rows = ids
            .iter()
            .enumerate()
            .map(|(i, id)| {
                #[allow(clippy::cast_precision_loss)]
                let y = i as f64 * 1_000.0;
                GeoRow::new(
                    RoadSegment {
                        id: SegmentId::from(*id),
                        length_m: 100.0,
                        subtype_text: None,
                        subclass: Some("COLLECTOR".to_string()),
                        ownership: None,
                        flow: None,
                        grade_separated: None,
                    },
                    MultiLineString::new(vec![line_string![(x: 0.0, y: y), (x: 100.0, y: y)]]),
                )
            })
            .collect();
        GeoTable::new(Some(Crs::NAD83_UTM_18N), rows)
    }

    /// `count` collisions in `year` on the road at `road_index`.
    fn on_road(road_index: usize, year: i32, count: usize) -> Vec<GeoRow<Collision, Point<f64>>> {
        #[allow(clippy::cast_precision_loss)]
        let y = road_index as f64 * 1_000.0 + 3.0;
        (0..count)
            .map(|_| GeoRow::new(collision(year, 1), Point::new(50.0, y)))
            .collect()
    }

    fn collisions(rows: Vec<Vec<GeoRow<Collision, Point<f64>>>>) -> GeoTable<Collision, Point<f64>> {
        GeoTable::new(Some(Crs::NAD83_UTM_18N), rows.into_iter().flatten().collect())
    }

    #[test]
    fn previous_year_count_becomes_lag() {
        let events = collisions(vec![on_road(0, 2019, 5), on_road(0, 2020, 8)]);
        let records =
            build_feature_table(&events, &roads(&["S"]), None, &FeatureConfig::default()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, 2019);
        assert_eq!(records[0].collisions_prev_year, 0);
        assert_eq!(records[0].injuries_prev_year, 0);
        assert_eq!(records[1].year, 2020);
        assert_eq!(records[1].collisions_total, 8);
        assert_eq!(records[1].collisions_prev_year, 5);
        assert_eq!(records[1].injuries_prev_year, 5);
        assert_eq!(records[1].subclass.as_deref(), Some("COLLECTOR"));
    }

    #[test]
    fn segments_without_events_are_absent() {
        let events = collisions(vec![on_road(1, 2019, 2)]);
        let records =
            build_feature_table(&events, &roads(&["A", "B", "C"]), None, &FeatureConfig::default())
                .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].segment_id.as_str(), "B");
    }

    #[test]
    fn integer_segment_ids_sort_numerically() {
        let events = collisions(vec![on_road(0, 2019, 1), on_road(1, 2019, 1)]);
        let records =
            build_feature_table(&events, &roads(&["10", "9"]), None, &FeatureConfig::default())
                .unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.segment_id.as_str()).collect();
        assert_eq!(ids, vec!["9", "10"]);
    }

    #[test]
    fn about_a_fifth_of_each_year_is_high_risk() {
        let ids: Vec<String> = (0..10).map(|i| format!("S{i}")).collect();
        let id_refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        let mut groups = Vec::new();
        for i in 0..10 {
            groups.push(on_road(i, 2019, i + 1));
            groups.push(on_road(i, 2020, 10 - i));
        }
        let records =
            build_feature_table(&collisions(groups), &roads(&id_refs), None, &FeatureConfig::default())
                .unwrap();

        for year in [2019, 2020] {
            let cohort: Vec<_> = records.iter().filter(|r| r.year == year).collect();
            assert_eq!(cohort.len(), 10);
            assert_eq!(cohort.iter().filter(|r| r.high_risk).count(), 2, "year {year}");
        }
    }

    #[test]
    fn construction_flag_is_static_per_segment() {
        let events = collisions(vec![on_road(0, 2019, 1), on_road(0, 2020, 1), on_road(1, 2020, 1)]);
        let construction = GeoTable::new(
            Some(Crs::NAD83_UTM_18N),
            vec![GeoRow::new(
                ConstructionEvent {
                    targeted_start: None,
                },
                Point::new(50.0, 15.0),
            )],
        );
        let records = build_feature_table(
            &events,
            &roads(&["A", "B"]),
            Some(&construction),
            &FeatureConfig::default(),
        )
        .unwrap();

        let flags: Vec<(&str, i32, bool)> = records
            .iter()
            .map(|r| (r.segment_id.as_str(), r.year, r.construction_flag))
            .collect();
        assert_eq!(
            flags,
            vec![("A", 2019, true), ("A", 2020, true), ("B", 2020, false)]
        );
    }

    #[test]
    fn rejects_out_of_range_quantile() {
        let config = FeatureConfig {
            high_risk_quantile: 1.5,
            ..FeatureConfig::default()
        };
        let err = build_feature_table(&collisions(vec![]), &roads(&["A"]), None, &config)
            .unwrap_err();
        assert!(matches!(err, FeatureError::InvalidQuantile(_)));
    }
}

//! Segment-year grouping, lag features and per-year labels.

use std::collections::{BTreeMap, BTreeSet};

use road_risk_features_models::SegmentYearRecord;
use road_risk_source_models::{Collision, RoadSegment, SegmentId};
use road_risk_spatial::AssociationTable;

/// Outcome totals for one segment in one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    /// Number of associated collisions.
    pub collisions: i64,
    /// Summed fatalities.
    pub fatal: i64,
    /// Summed injuries.
    pub injuries: i64,
}

/// Sums associated collisions per (segment, year).
///
/// Collisions with no segment or no parsed year have no grouping key and
/// are left out. A collision matched to several segments counts toward
/// each of them.
#[must_use]
pub fn group_segment_years(
    associations: &AssociationTable<Collision, SegmentId>,
) -> BTreeMap<(SegmentId, i32), Totals> {
    let mut groups: BTreeMap<(SegmentId, i32), Totals> = BTreeMap::new();
    let mut skipped = 0usize;

    for row in associations {
        let collision = &row.attributes.event;
        let (Some(segment), Some(year)) = (&row.attributes.line, collision.year) else {
            skipped += 1;
            continue;
        };
        let totals = groups.entry((segment.clone(), year)).or_default();
        totals.collisions += 1;
        totals.fatal += collision.fatalities;
        totals.injuries += collision.injuries;
    }

    if skipped > 0 {
        log::debug!("{skipped} associated rows had no segment or no year");
    }
    groups
}

/// Builds unlabeled records from grouped totals, sorted by (segment, year).
///
/// Segment attributes come from the first row per identifier. The lag
/// fields are filled separately by [`apply_lags`].
#[must_use]
pub fn merge_segment_attributes<'a>(
    groups: BTreeMap<(SegmentId, i32), Totals>,
    segments: impl IntoIterator<Item = &'a RoadSegment>,
    flagged: &BTreeSet<SegmentId>,
) -> Vec<SegmentYearRecord> {
    let mut attributes: BTreeMap<&SegmentId, &RoadSegment> = BTreeMap::new();
    for segment in segments {
        attributes.entry(&segment.id).or_insert(segment);
    }

    groups
        .into_iter()
        .map(|((segment_id, year), totals)| {
            let attrs = attributes.get(&segment_id).copied();
            let text = |f: fn(&RoadSegment) -> Option<String>| attrs.and_then(f);
            SegmentYearRecord {
                construction_flag: flagged.contains(&segment_id),
                length_m: attrs.map_or(0.0, |s| s.length_m),
                subtype_text: text(|s| s.subtype_text.clone()),
                subclass: text(|s| s.subclass.clone()),
                ownership: text(|s| s.ownership.clone()),
                flow: text(|s| s.flow.clone()),
                grade_separated: text(|s| s.grade_separated.clone()),
                segment_id,
                year,
                collisions_total: totals.collisions,
                fatal_major: totals.fatal,
                injuries_total: totals.injuries,
                collisions_prev_year: 0,
                fatal_prev_year: 0,
                injuries_prev_year: 0,
                high_risk: false,
            }
        })
        .collect()
}

/// Fills each record's lag fields from the previous record of the same
/// segment.
///
/// `records` must be sorted by (segment, year). The shift is by position,
/// so a gap year is skipped over rather than treated as zero. A segment's
/// first record keeps zero lags.
pub fn apply_lags(records: &mut [SegmentYearRecord]) {
    let mut previous: Option<(SegmentId, Totals)> = None;

    for record in records.iter_mut() {
        let (c, f, i) = match &previous {
            Some((id, totals)) if *id == record.segment_id => {
                (totals.collisions, totals.fatal, totals.injuries)
            }
            _ => (0, 0, 0),
        };
        record.collisions_prev_year = c;
        record.fatal_prev_year = f;
        record.injuries_prev_year = i;

        previous = Some((
            record.segment_id.clone(),
            Totals {
                collisions: record.collisions_total,
                fatal: record.fatal_major,
                injuries: record.injuries_total,
            },
        ));
    }
}

/// Linear-interpolated quantile of `values`, `q` in `[0, 1]`.
///
/// Interpolates between the two closest ranks at `q * (n - 1)`. Returns
/// `None` for an empty slice.
#[must_use]
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    #[allow(clippy::cast_precision_loss)]
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (lo, hi) = (pos.floor() as usize, pos.ceil() as usize);
    #[allow(clippy::cast_precision_loss)]
    let frac = pos - lo as f64;

    Some((sorted[hi] - sorted[lo]).mul_add(frac, sorted[lo]))
}

/// Per-year threshold on `collisions_total` at quantile `q`.
#[must_use]
pub fn year_thresholds(records: &[SegmentYearRecord], q: f64) -> BTreeMap<i32, f64> {
    let mut by_year: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
    for record in records {
        #[allow(clippy::cast_precision_loss)]
        let total = record.collisions_total as f64;
        by_year.entry(record.year).or_default().push(total);
    }

    by_year
        .into_iter()
        .filter_map(|(year, totals)| quantile(&totals, q).map(|t| (year, t)))
        .collect()
}

/// Labels each record high-risk when its collision total is at or above
/// its own year's threshold.
pub fn apply_labels(records: &mut [SegmentYearRecord], q: f64) {
    let thresholds = year_thresholds(records, q);
    for (year, threshold) in &thresholds {
        log::debug!("High-risk threshold for {year}: {threshold}");
    }

    for record in records.iter_mut() {
        #[allow(clippy::cast_precision_loss)]
        let total = record.collisions_total as f64;
        record.high_risk = thresholds.get(&record.year).is_some_and(|t| total >= *t);
    }
}

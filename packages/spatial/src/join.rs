//! Buffered point-to-line association.
//!
//! Lines are indexed in an R-tree by their bounding boxes expanded by the
//! buffer distance. Each point queries the tree for candidates and keeps
//! every line whose buffered geometry contains it.

use geo::{BoundingRect as _, Distance as _, Euclidean, Intersects as _, MultiLineString, Point};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{AABB, RTree};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::SpatialError;
use crate::table::{GeoRow, GeoTable};

/// R-tree entry: a buffered line envelope and the line's row index.
type LineEntry = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Whether unmatched points survive a join.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JoinMode {
    /// Keep unmatched points with no line attached.
    #[default]
    Left,
    /// Drop unmatched points.
    Inner,
}

/// A point paired with at most one matched line's attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Association<T, L> {
    /// The point's own attributes.
    pub event: T,
    /// The matched line's attributes, or `None` for an unmatched point in
    /// [`JoinMode::Left`].
    pub line: Option<L>,
}

/// Result of a point-to-line join, one row per (point, match) pair.
pub type AssociationTable<T, L> = GeoTable<Association<T, L>, Point<f64>>;

/// Associates each point with every line whose `buffer_m` buffer contains
/// it.
///
/// A point inside several buffers yields one row per matching line. A
/// buffer of zero (or a negative or non-finite value) means exact
/// intersection. Rows come out in point order, and within a point in line
/// order.
///
/// # Errors
///
/// Returns [`SpatialError::CrsMismatch`] if the tables are not in the same
/// frame. Two undeclared frames count as the same.
pub fn buffered_intersection_join<T, L>(
    points: &GeoTable<T, Point<f64>>,
    lines: &GeoTable<L, MultiLineString<f64>>,
    buffer_m: f64,
    mode: JoinMode,
) -> Result<AssociationTable<T, L>, SpatialError>
where
    T: Clone,
    L: Clone,
{
    let crs = points.crs();
    if crs != lines.crs() {
        return Err(SpatialError::CrsMismatch {
            points: describe(crs),
            lines: describe(lines.crs()),
        });
    }

    if let Some(crs) = crs
        && crs.is_geographic()
    {
        log::warn!("Buffered join in geographic frame {crs}: buffer is in degrees, not meters");
    }

    let buffer = if buffer_m.is_finite() && buffer_m > 0.0 {
        buffer_m
    } else {
        0.0
    };

    let index = build_index(lines, buffer);
    let mut rows = Vec::with_capacity(points.len());
    let mut unmatched = 0usize;

    for point_row in points {
        let point = point_row.geometry;
        let query = AABB::from_point([point.x(), point.y()]);

        let mut candidates: Vec<usize> = index
            .locate_in_envelope_intersecting(&query)
            .map(|entry| entry.data)
            .collect();
        candidates.sort_unstable();

        let before = rows.len();
        for idx in candidates {
            let line_row = &lines.rows()[idx];
            if contains_within_buffer(&line_row.geometry, &point, buffer) {
                rows.push(GeoRow::new(
                    Association {
                        event: point_row.attributes.clone(),
                        line: Some(line_row.attributes.clone()),
                    },
                    point,
                ));
            }
        }

        if rows.len() == before {
            unmatched += 1;
            if mode == JoinMode::Left {
                rows.push(GeoRow::new(
                    Association {
                        event: point_row.attributes.clone(),
                        line: None,
                    },
                    point,
                ));
            }
        }
    }

    log::debug!(
        "Joined {} points to {} lines (buffer {buffer} m, {mode}): {} rows, {unmatched} unmatched",
        points.len(),
        lines.len(),
        rows.len()
    );

    Ok(GeoTable::new(crs, rows))
}

fn describe(crs: Option<crate::Crs>) -> String {
    crs.map_or_else(|| "undeclared".to_string(), |c| c.to_string())
}

fn build_index<L>(lines: &GeoTable<L, MultiLineString<f64>>, buffer: f64) -> RTree<LineEntry> {
    let entries: Vec<LineEntry> = lines
        .iter()
        .enumerate()
        .filter_map(|(idx, row)| {
            let rect = row.geometry.bounding_rect()?;
            let envelope = Rectangle::from_corners(
                [rect.min().x - buffer, rect.min().y - buffer],
                [rect.max().x + buffer, rect.max().y + buffer],
            );
            Some(GeomWithData::new(envelope, idx))
        })
        .collect();

    RTree::bulk_load(entries)
}

/// Whether `point` lies within `buffer` of `line`. A zero buffer reduces
/// to an exact intersection test.
fn contains_within_buffer(line: &MultiLineString<f64>, point: &Point<f64>, buffer: f64) -> bool {
    if buffer > 0.0 {
        line.0
            .iter()
            .any(|part| Euclidean.distance(point, part) <= buffer)
    } else {
        line.intersects(point)
    }
}

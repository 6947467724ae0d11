#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geometry adapter for the road-risk pipeline.
//!
//! Converts coordinate columns into point geometries, reprojects tables
//! between a geographic frame and a fixed projected frame, and associates
//! points with nearby lines through an R-tree backed buffered join. Every
//! metric operation (buffers, lengths) is expected to run in the projected
//! frame.

pub mod crs;
pub mod join;
pub mod points;
pub mod projection;
pub mod reproject;
pub mod table;

pub use crs::{Crs, Frames};
pub use join::{Association, AssociationTable, JoinMode, buffered_intersection_join};
pub use points::points_from_coordinates;
pub use reproject::reproject;
pub use table::{GeoRow, GeoTable};

/// Errors raised when a geometric precondition does not hold.
#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    /// Reprojection was requested for a table with no declared frame.
    #[error("Geometry has no declared reference frame; cannot reproject to {target}")]
    MissingReferenceFrame {
        /// The frame reprojection was asked to produce.
        target: Crs,
    },

    /// A join was attempted between tables in different frames.
    #[error("Reference frame mismatch: points are {points}, lines are {lines}")]
    CrsMismatch {
        /// Frame of the point table.
        points: String,
        /// Frame of the line table.
        lines: String,
    },

    /// A frame identifier could not be parsed or is not supported.
    #[error("Unknown reference frame: {0}")]
    UnknownReferenceFrame(String),
}

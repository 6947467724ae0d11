#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Dataset cleaners for collision, road centreline and construction feeds.
//!
//! Each cleaner is a stateless function from raw rows to a projected
//! [`GeoTable`](road_risk_spatial::GeoTable). Column names are looked up
//! through the field maps in [`fields`], resolved once per call. Row-level
//! problems are coerced or dropped; only dataset-shape problems are
//! reported as a [`CleanError`].

pub mod collisions;
pub mod construction;
pub mod fields;
pub mod parsing;
pub mod progress;
pub mod roads;

pub use collisions::clean_collisions;
pub use construction::clean_construction;
pub use fields::{CollisionFields, ConstructionFields, FieldMaps, RoadFields};
pub use roads::{RoadInput, clean_roads};

use road_risk_spatial::SpatialError;

/// Errors that abort cleaning of a dataset.
#[derive(Debug, thiserror::Error)]
pub enum CleanError {
    /// Road input has no geometry in any recognized form.
    #[error("Road input has no geometry: expected a geometric table or a `{field}` WKT column")]
    MissingGeometry {
        /// The WKT column that was looked for.
        field: String,
    },

    /// Construction input has no recognized coordinate column pair.
    #[error("No coordinate columns found; tried longitude {longitude:?} and latitude {latitude:?}")]
    MissingCoordinates {
        /// Longitude candidates tried.
        longitude: Vec<String>,
        /// Latitude candidates tried.
        latitude: Vec<String>,
    },

    /// A geometry operation failed.
    #[error("Spatial error: {0}")]
    Spatial(#[from] SpatialError),
}

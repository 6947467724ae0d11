#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! End-to-end road collision-risk feature pipeline.
//!
//! Reads the collision, road and construction files named in a
//! [`PipelineConfig`], cleans each into the projected frame, builds the
//! labeled segment-year table and writes it to Parquet. Each stage hands
//! a new table to the next; nothing is shared between runs.

pub mod config;
pub mod read;
pub mod write;

pub use config::PipelineConfig;

use road_risk_features::{FeatureError, build_feature_table};
use road_risk_features_models::SegmentYearRecord;
use road_risk_source::progress::{ProgressCallback, Stage};
use road_risk_source::{CleanError, clean_collisions, clean_construction, clean_roads};
use road_risk_spatial::SpatialError;

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV input could not be read.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// `GeoJSON` input could not be parsed.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    /// Configuration file is not valid.
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// `DuckDB` failed while writing output.
    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    /// An input dataset has the wrong shape.
    #[error(transparent)]
    Clean(#[from] CleanError),

    /// Feature building failed.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// A geometry operation failed.
    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

/// Reads, cleans and aggregates the configured inputs.
///
/// # Errors
///
/// Returns [`PipelineError`] if an input cannot be read or has the wrong
/// shape, or if association fails.
pub fn build_features(
    config: &PipelineConfig,
    progress: &dyn ProgressCallback,
) -> Result<Vec<SegmentYearRecord>, PipelineError> {
    progress.start_stage(Stage::Read);
    let raw_collisions = read::read_csv_records(&config.collisions)?;
    let raw_roads = read::read_roads(&config.roads)?;
    let raw_construction = config
        .construction
        .as_deref()
        .map(read::read_csv_records)
        .transpose()?;
    progress.inc(1);

    progress.start_stage(Stage::Clean);
    let fields = &config.fields;
    let collisions = clean_collisions(&raw_collisions, &fields.collisions, &config.frames)?;
    let roads = clean_roads(raw_roads, &fields.roads, &config.frames)?;
    let construction = raw_construction
        .map(|records| clean_construction(&records, &fields.construction, &config.frames))
        .transpose()?;
    progress.inc(1);

    progress.start_stage(Stage::Features);
    let records = build_feature_table(
        &collisions,
        &roads,
        construction.as_ref(),
        &config.features,
    )?;
    progress.inc(1);

    Ok(records)
}

/// Runs the whole pipeline and writes the Parquet output.
///
/// Returns the number of rows written.
///
/// # Errors
///
/// Returns [`PipelineError`] if any stage fails.
pub fn run(config: &PipelineConfig, progress: &dyn ProgressCallback) -> Result<u64, PipelineError> {
    progress.set_total(Stage::ALL.len() as u64);

    let records = build_features(config, progress)?;

    progress.start_stage(Stage::Write);
    let written = write::write_parquet(&records, &config.output)?;
    progress.inc(1);

    progress.finish(format!("Wrote {written} segment-year records"));
    Ok(written)
}

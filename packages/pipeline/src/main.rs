#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Builds the segment-year feature table.
//!
//! ```text
//! road_risk [--config pipeline.toml] [--collisions PATH] [--roads PATH]
//!           [--construction PATH | --no-construction] [--buffer-m 12]
//!           [--out data/processed/segment_year_features.parquet]
//! ```
//!
//! Flags override values from the configuration file.

use std::path::PathBuf;

use clap::Parser;
use road_risk_cli_utils::IndicatifProgress;
use road_risk_pipeline::PipelineConfig;

#[derive(Parser)]
#[command(name = "road_risk", about = "Build segment-year feature table")]
struct Cli {
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Collision CSV
    #[arg(long)]
    collisions: Option<PathBuf>,

    /// Road centrelines (GeoJSON, or CSV with a WKT geometry column)
    #[arg(long)]
    roads: Option<PathBuf>,

    /// Construction CSV
    #[arg(long, conflicts_with = "no_construction")]
    construction: Option<PathBuf>,

    /// Skip the construction flag
    #[arg(long)]
    no_construction: bool,

    /// Collision-to-segment buffer in meters
    #[arg(long)]
    buffer_m: Option<f64>,

    /// Parquet output path
    #[arg(long)]
    out: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(path) = self.collisions {
            config.collisions = path;
        }
        if let Some(path) = self.roads {
            config.roads = path;
        }
        if self.no_construction {
            config.construction = None;
        } else if let Some(path) = self.construction {
            config.construction = Some(path);
        }
        if let Some(buffer_m) = self.buffer_m {
            config.features.buffer_m = buffer_m;
        }
        if let Some(path) = self.out {
            config.output = path;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = road_risk_cli_utils::init_logger();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    cli.apply(&mut config);

    log::info!(
        "Building features: collisions={} roads={} construction={} buffer={} m",
        config.collisions.display(),
        config.roads.display(),
        config
            .construction
            .as_deref()
            .map_or_else(|| "none".to_string(), |p| p.display().to_string()),
        config.features.buffer_m
    );

    let progress = IndicatifProgress::stages_bar(&multi);
    let rows = road_risk_pipeline::run(&config, progress.as_ref())?;

    println!(
        "Wrote features to {} (rows={rows})",
        config.output.display()
    );
    Ok(())
}

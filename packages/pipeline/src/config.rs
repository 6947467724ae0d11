//! Pipeline configuration.
//!
//! Every field has a default, so a TOML file only needs the values it
//! changes:
//!
//! ```toml
//! collisions = "data/raw/collisions_2017_2023.csv"
//! output = "out/features.parquet"
//!
//! [frames]
//! projected = "EPSG:32618"
//!
//! [features]
//! buffer_m = 15.0
//!
//! [fields.collisions]
//! longitude = "LONGITUDE"
//! ```

use std::path::{Path, PathBuf};

use road_risk_features::FeatureConfig;
use road_risk_source::FieldMaps;
use road_risk_spatial::Frames;
use serde::{Deserialize, Serialize};

use crate::PipelineError;

/// Inputs, output and tunables for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Collision CSV.
    pub collisions: PathBuf,
    /// Road centrelines: `GeoJSON` or CSV with a WKT column.
    pub roads: PathBuf,
    /// Construction CSV. `None` skips the construction flag.
    pub construction: Option<PathBuf>,
    /// Parquet output path.
    pub output: PathBuf,
    /// Geographic and projected reference frames.
    pub frames: Frames,
    /// Association and labeling parameters.
    pub features: FeatureConfig,
    /// Source column names.
    pub fields: FieldMaps,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            collisions: PathBuf::from("data/raw/Traffic_Collision_Data.csv"),
            roads: PathBuf::from("data/raw/Road_Centrelines.geojson"),
            construction: Some(PathBuf::from("data/raw/Upcoming_Construction.csv")),
            output: PathBuf::from("data/processed/segment_year_features.parquet"),
            frames: Frames::default(),
            features: FeatureConfig::default(),
            fields: FieldMaps::default(),
        }
    }
}

impl PipelineConfig {
    /// Loads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the file cannot be read, or
    /// [`PipelineError::Config`] if it is not valid TOML for this struct.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

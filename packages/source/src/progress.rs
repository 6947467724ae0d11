//! Stage progress reporting.
//!
//! The pipeline reports each stage it enters through a
//! [`ProgressCallback`], leaving rendering to the caller: the CLI draws an
//! `indicatif` bar, tests pass [`NullProgress`].

use serde::Serialize;

/// A named step of a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reading input files.
    Read,
    /// Cleaning collisions, roads and construction records.
    Clean,
    /// Associating collisions and building labeled segment-years.
    Features,
    /// Persisting the feature table.
    Write,
}

impl Stage {
    /// Every stage, in execution order.
    pub const ALL: [Self; 4] = [Self::Read, Self::Clean, Self::Features, Self::Write];

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Read => "Reading inputs",
            Self::Clean => "Cleaning records",
            Self::Features => "Building segment-year features",
            Self::Write => "Writing features",
        }
    }
}

/// Receives stage updates from a pipeline run.
pub trait ProgressCallback: Send + Sync {
    /// Set the total number of stages.
    fn set_total(&self, total: u64);

    /// Called when `stage` begins.
    fn start_stage(&self, stage: Stage);

    /// Called when the current stage completes.
    fn inc(&self, delta: u64);

    /// Mark the run complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn start_stage(&self, _stage: Stage) {}
    fn inc(&self, _delta: u64) {}
    fn finish(&self, _msg: String) {}
}

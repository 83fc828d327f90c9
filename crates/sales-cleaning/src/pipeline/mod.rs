//! Pipeline module.
//!
//! This module provides the cleaning pipeline, the row-filtering and
//! feature stages it owns, and progress reporting.

mod builder;
pub mod features;
pub mod outliers;
pub mod progress;

pub use builder::{Pipeline, PipelineBuilder};
pub use features::FeatureDeriver;
pub use outliers::OutlierFilter;
pub use progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
    TracingProgressReporter,
};

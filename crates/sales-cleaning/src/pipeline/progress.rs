//! Progress reporting for the cleaning pipeline.
//!
//! The pipeline never prints. Instead it emits a [`ProgressUpdate`] when each
//! stage starts and finishes, and a terminal update when the run completes or
//! fails. Callers subscribe by handing a [`ProgressReporter`] to the
//! [`PipelineBuilder`](crate::pipeline::PipelineBuilder).
//!
//! # Example
//!
//! ```rust,ignore
//! use sales_cleaning::Pipeline;
//!
//! let result = Pipeline::builder()
//!     .on_progress(|update| {
//!         println!("[{:?}] {}", update.stage, update.message);
//!     })
//!     .build()?
//!     .process(df)?;
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// Stages of the cleaning pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    /// Reading the raw CSV file
    Loading,
    /// Filling missing numeric/text cells
    Imputation,
    /// Parsing the date and numeric columns
    TypeCoercion,
    /// Dropping exact-duplicate rows
    Deduplication,
    /// Dropping rows outside the z-score band
    OutlierFiltering,
    /// Lowercasing and trimming text columns
    TextNormalization,
    /// Adding computed columns
    FeatureDerivation,
    /// Writing the cleaned CSV file
    Writing,
    /// Pipeline completed successfully
    Complete,
    /// Pipeline failed with an error
    Failed,
}

impl PipelineStage {
    /// The in-memory cleaning stages, in the order they run.
    pub const CLEANING_STAGES: [PipelineStage; 6] = [
        PipelineStage::Imputation,
        PipelineStage::TypeCoercion,
        PipelineStage::Deduplication,
        PipelineStage::OutlierFiltering,
        PipelineStage::TextNormalization,
        PipelineStage::FeatureDerivation,
    ];

    /// Returns a human-readable name for the stage.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Loading => "Loading Data",
            Self::Imputation => "Imputing Missing Values",
            Self::TypeCoercion => "Coercing Types",
            Self::Deduplication => "Removing Duplicates",
            Self::OutlierFiltering => "Filtering Outliers",
            Self::TextNormalization => "Normalizing Text",
            Self::FeatureDerivation => "Deriving Features",
            Self::Writing => "Writing Output",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
        }
    }

    /// Returns the typical weight of this stage in the overall run (0.0 - 1.0).
    ///
    /// Weights of the non-terminal stages sum to 1.0.
    pub fn weight(&self) -> f32 {
        match self {
            Self::Loading => 0.15,
            Self::Imputation => 0.15,
            Self::TypeCoercion => 0.15,
            Self::Deduplication => 0.10,
            Self::OutlierFiltering => 0.10,
            Self::TextNormalization => 0.10,
            Self::FeatureDerivation => 0.10,
            Self::Writing => 0.15,
            Self::Complete => 0.0,
            Self::Failed => 0.0,
        }
    }

    /// Returns the cumulative progress at the start of this stage.
    pub fn base_progress(&self) -> f32 {
        match self {
            Self::Loading => 0.0,
            Self::Imputation => 0.15,
            Self::TypeCoercion => 0.30,
            Self::Deduplication => 0.45,
            Self::OutlierFiltering => 0.55,
            Self::TextNormalization => 0.65,
            Self::FeatureDerivation => 0.75,
            Self::Writing => 0.85,
            Self::Complete => 1.0,
            Self::Failed => 0.0,
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A single progress event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Current pipeline stage
    pub stage: PipelineStage,

    /// Overall progress (0.0 - 1.0)
    pub progress: f32,

    /// Progress within current stage (0.0 - 1.0)
    pub stage_progress: f32,

    /// Human-readable message describing current activity
    pub message: String,

    /// Row count of the table after the stage (set on stage completion)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,

    /// Column count of the table after the stage (set on stage completion)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<usize>,
}

impl ProgressUpdate {
    /// Creates a new progress update for a stage.
    pub fn new(stage: PipelineStage, stage_progress: f32, message: impl Into<String>) -> Self {
        let progress = stage.base_progress() + (stage.weight() * stage_progress);
        Self {
            stage,
            progress: progress.clamp(0.0, 1.0),
            stage_progress: stage_progress.clamp(0.0, 1.0),
            message: message.into(),
            rows: None,
            columns: None,
        }
    }

    /// Attaches the table shape `(rows, columns)` to the update.
    pub fn with_shape(mut self, shape: (usize, usize)) -> Self {
        self.rows = Some(shape.0);
        self.columns = Some(shape.1);
        self
    }

    /// Creates a completion progress update.
    pub fn complete(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Complete,
            progress: 1.0,
            stage_progress: 1.0,
            message: message.into(),
            rows: None,
            columns: None,
        }
    }

    /// Creates a failed progress update.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            stage: PipelineStage::Failed,
            progress: 0.0,
            stage_progress: 0.0,
            message: message.into(),
            rows: None,
            columns: None,
        }
    }

    /// Returns true for the `Complete` and `Failed` updates.
    pub fn is_terminal(&self) -> bool {
        matches!(self.stage, PipelineStage::Complete | PipelineStage::Failed)
    }
}

/// Trait for receiving progress updates during a run.
///
/// Implementations must be `Send + Sync` so a pipeline carrying a reporter can
/// be moved to a worker thread.
pub trait ProgressReporter: Send + Sync {
    /// Called when a stage starts or finishes, and once at the end of the run.
    fn report(&self, update: ProgressUpdate);
}

/// Wrapper that implements [`ProgressReporter`] using a closure.
pub struct ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    /// Creates a new closure-based progress reporter.
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressReporter for ClosureProgressReporter<F>
where
    F: Fn(ProgressUpdate) + Send + Sync,
{
    fn report(&self, update: ProgressUpdate) {
        (self.callback)(update);
    }
}

/// Reporter that forwards finished stages and terminal events to `tracing`.
///
/// Stage-start updates are dropped to keep the log to one line per stage.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgressReporter;

impl ProgressReporter for TracingProgressReporter {
    fn report(&self, update: ProgressUpdate) {
        if update.stage_progress < 1.0 && !update.is_terminal() {
            return;
        }
        match (update.rows, update.columns) {
            (Some(rows), Some(columns)) => info!(
                "[{:.0}%] {}: {} ({} rows x {} columns)",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message,
                rows,
                columns
            ),
            _ => info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            ),
        }
    }
}

static_assertions::assert_impl_all!(ProgressUpdate: Send, Sync);
static_assertions::assert_impl_all!(TracingProgressReporter: ProgressReporter);

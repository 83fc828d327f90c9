//! Result types of a cleaning run: per-stage reports and the run summary.

use crate::pipeline::PipelineStage;
use crate::utils::{column_names, total_null_count};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Before/after snapshot of a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub stage: PipelineStage,
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    /// Null cells in the whole table before the stage ran.
    pub nulls_before: usize,
    pub nulls_after: usize,
    /// Columns present after the stage that were not present before it.
    pub added_columns: Vec<String>,
    /// Human-readable description of what the stage did.
    pub steps: Vec<String>,
}

impl StageReport {
    /// Compare the tables a stage received and produced.
    pub fn new(
        stage: PipelineStage,
        before: &DataFrame,
        after: &DataFrame,
        steps: Vec<String>,
    ) -> Self {
        let existing = column_names(before);
        let added_columns = column_names(after)
            .into_iter()
            .filter(|name| !existing.contains(name))
            .collect();

        Self {
            stage,
            rows_before: before.height(),
            rows_after: after.height(),
            columns_before: before.width(),
            columns_after: after.width(),
            nulls_before: total_null_count(before),
            nulls_after: total_null_count(after),
            added_columns,
            steps,
        }
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Null cells that the stage replaced with values.
    pub fn nulls_filled(&self) -> usize {
        self.nulls_before.saturating_sub(self.nulls_after)
    }

    /// Null cells that the stage introduced.
    pub fn nulls_introduced(&self) -> usize {
        self.nulls_after.saturating_sub(self.nulls_before)
    }
}

/// Totals of a cleaning run, serialized for `--json` and report files.
///
/// # Example
///
/// ```rust,ignore
/// let result = pipeline.run()?;
/// println!("Kept {} of {} rows", result.summary.rows_after, result.summary.rows_before);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,

    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,

    /// Missing cells filled by imputation.
    pub cells_imputed: usize,
    /// Cells set to null because they failed type coercion.
    pub cells_invalidated: usize,
    pub duplicates_removed: usize,
    pub outliers_removed: usize,
    /// Columns added by feature derivation.
    pub derived_columns: Vec<String>,

    /// Per-stage reports in execution order.
    pub stages: Vec<StageReport>,
}

impl CleaningSummary {
    /// Build the totals from the stage reports of one run over `input`.
    pub fn from_stages(input: &DataFrame, output: &DataFrame, stages: Vec<StageReport>) -> Self {
        let find = |stage: PipelineStage| stages.iter().find(|r| r.stage == stage);

        Self {
            rows_before: input.height(),
            rows_after: output.height(),
            columns_before: input.width(),
            columns_after: output.width(),
            cells_imputed: find(PipelineStage::Imputation).map_or(0, StageReport::nulls_filled),
            cells_invalidated: find(PipelineStage::TypeCoercion)
                .map_or(0, StageReport::nulls_introduced),
            duplicates_removed: find(PipelineStage::Deduplication)
                .map_or(0, StageReport::rows_removed),
            outliers_removed: find(PipelineStage::OutlierFiltering)
                .map_or(0, StageReport::rows_removed),
            derived_columns: find(PipelineStage::FeatureDerivation)
                .map(|r| r.added_columns.clone())
                .unwrap_or_default(),
            stages,
            ..Self::default()
        }
    }

    pub fn rows_removed(&self) -> usize {
        self.rows_before.saturating_sub(self.rows_after)
    }

    /// Calculate the percentage of rows removed.
    pub fn rows_removed_percentage(&self) -> f64 {
        if self.rows_before == 0 {
            0.0
        } else {
            (self.rows_removed() as f64 / self.rows_before as f64) * 100.0
        }
    }
}

impl fmt::Display for CleaningSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cleaning summary")?;
        if let Some(input) = &self.input_path {
            writeln!(f, "  Input:              {}", input)?;
        }
        if let Some(output) = &self.output_path {
            writeln!(f, "  Output:             {}", output)?;
        }
        writeln!(
            f,
            "  Rows:               {} -> {} ({:.1}% removed)",
            self.rows_before,
            self.rows_after,
            self.rows_removed_percentage()
        )?;
        writeln!(
            f,
            "  Columns:            {} -> {}",
            self.columns_before, self.columns_after
        )?;
        writeln!(f, "  Cells imputed:      {}", self.cells_imputed)?;
        writeln!(f, "  Cells invalidated:  {}", self.cells_invalidated)?;
        writeln!(f, "  Duplicates removed: {}", self.duplicates_removed)?;
        writeln!(f, "  Outliers removed:   {}", self.outliers_removed)?;
        if !self.derived_columns.is_empty() {
            writeln!(f, "  Derived columns:    {}", self.derived_columns.join(", "))?;
        }
        write!(f, "  Duration:           {} ms", self.duration_ms)
    }
}

/// Cleaned table and run summary.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub data: DataFrame,
    pub summary: CleaningSummary,
}

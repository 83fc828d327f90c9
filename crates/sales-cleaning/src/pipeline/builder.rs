//! Main cleaning pipeline module.
//!
//! This module provides the core `Pipeline` struct and builder for
//! orchestrating the cleaning workflow.

use crate::cleaner::{Deduplicator, TextNormalizer, TypeCoercer};
use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::Result;
use crate::imputers::MissingValueFiller;
use crate::io::{load_csv, write_csv};
use crate::pipeline::features::FeatureDeriver;
use crate::pipeline::outliers::OutlierFilter;
use crate::pipeline::progress::{
    ClosureProgressReporter, PipelineStage, ProgressReporter, ProgressUpdate,
};
use crate::types::{CleaningSummary, PipelineResult, StageReport};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// The main cleaning pipeline.
///
/// Use [`Pipeline::builder()`] to create a new pipeline with custom configuration.
///
/// # Example
///
/// ```rust,ignore
/// use sales_cleaning::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .on_progress(|update| {
///         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
///     })
///     .config(PipelineConfig::builder().zscore_threshold(2.5).build()?)
///     .build()?
///     .run()?;
///
/// println!("{}", result.summary);
/// ```
pub struct Pipeline {
    config: PipelineConfig,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
    filler: MissingValueFiller,
    coercer: TypeCoercer,
    deduplicator: Deduplicator,
    outlier_filter: OutlierFilter,
    text_normalizer: TextNormalizer,
    feature_deriver: FeatureDeriver,
}

// Ensure Pipeline is Send (can be moved to another thread)
static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// The validated configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full workflow on the configured input and output paths.
    pub fn run(&self) -> Result<PipelineResult> {
        self.run_files(&self.config.input_path, &self.config.output_path)
    }

    /// Load `input`, clean it and write the result to `output`.
    ///
    /// # Errors
    ///
    /// Any failure is returned as
    /// [`CleaningError::StageFailed`](crate::error::CleaningError::StageFailed)
    /// naming the stage that failed. Nothing is written unless every stage succeeded.
    pub fn run_files(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<PipelineResult> {
        let (input, output) = (input.as_ref(), output.as_ref());
        let outcome = self.run_files_internal(input, output);
        self.finish(outcome)
    }

    /// Process an already loaded DataFrame through the cleaning stages.
    ///
    /// Returns a `PipelineResult` containing the cleaned data and the run summary.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        let outcome = self.process_internal(&df);
        self.finish(outcome)
    }

    /// Report progress if a reporter is configured.
    fn report_progress(&self, update: ProgressUpdate) {
        if let Some(reporter) = &self.progress_reporter {
            reporter.report(update);
        }
    }

    /// Emit the terminal progress event for a finished run.
    fn finish(&self, outcome: Result<PipelineResult>) -> Result<PipelineResult> {
        match outcome {
            Ok(result) => {
                self.report_progress(
                    ProgressUpdate::complete("Pipeline completed successfully")
                        .with_shape(result.data.shape()),
                );
                Ok(result)
            }
            Err(e) => {
                self.report_progress(ProgressUpdate::failed(e.to_string()));
                error!("Pipeline error: {}", e);
                Err(e)
            }
        }
    }

    fn run_files_internal(&self, input: &Path, output: &Path) -> Result<PipelineResult> {
        self.report_progress(ProgressUpdate::new(
            PipelineStage::Loading,
            0.0,
            format!("Reading {}", input.display()),
        ));
        let df = load_csv(input).map_err(|e| e.in_stage(PipelineStage::Loading))?;
        self.report_progress(
            ProgressUpdate::new(PipelineStage::Loading, 1.0, "Dataset loaded")
                .with_shape(df.shape()),
        );

        let mut result = self.process_internal(&df)?;

        self.report_progress(ProgressUpdate::new(
            PipelineStage::Writing,
            0.0,
            format!("Writing {}", output.display()),
        ));
        write_csv(&result.data, output).map_err(|e| e.in_stage(PipelineStage::Writing))?;
        self.report_progress(
            ProgressUpdate::new(PipelineStage::Writing, 1.0, "Output written")
                .with_shape(result.data.shape()),
        );

        result.summary.input_path = Some(input.display().to_string());
        result.summary.output_path = Some(output.display().to_string());
        Ok(result)
    }

    fn process_internal(&self, df: &DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        info!("Starting cleaning pipeline on {:?} table", df.shape());

        let mut reports = Vec::with_capacity(PipelineStage::CLEANING_STAGES.len());

        let current = self.run_stage(PipelineStage::Imputation, df, &mut reports, |df| {
            self.filler.apply(df)
        })?;
        let current = self.run_stage(PipelineStage::TypeCoercion, &current, &mut reports, |df| {
            self.coercer.apply(df)
        })?;
        let current = self.run_stage(PipelineStage::Deduplication, &current, &mut reports, |df| {
            self.deduplicator.apply(df)
        })?;
        let current = self.run_stage(
            PipelineStage::OutlierFiltering,
            &current,
            &mut reports,
            |df| self.outlier_filter.apply(df),
        )?;
        let current = self.run_stage(
            PipelineStage::TextNormalization,
            &current,
            &mut reports,
            |df| self.text_normalizer.apply(df),
        )?;
        let current = self.run_stage(
            PipelineStage::FeatureDerivation,
            &current,
            &mut reports,
            |df| self.feature_deriver.apply(df),
        )?;

        let mut summary = CleaningSummary::from_stages(df, &current, reports);
        summary.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Cleaning complete: {} -> {} rows, {} -> {} columns in {}ms",
            summary.rows_before,
            summary.rows_after,
            summary.columns_before,
            summary.columns_after,
            summary.duration_ms
        );

        Ok(PipelineResult {
            data: current,
            summary,
        })
    }

    /// Run one stage, wrapping its error with the stage and recording its report.
    fn run_stage<F>(
        &self,
        stage: PipelineStage,
        df: &DataFrame,
        reports: &mut Vec<StageReport>,
        apply: F,
    ) -> Result<DataFrame>
    where
        F: FnOnce(&DataFrame) -> Result<(DataFrame, Vec<String>)>,
    {
        self.report_progress(
            ProgressUpdate::new(stage, 0.0, format!("{}...", stage.display_name()))
                .with_shape(df.shape()),
        );
        info!("Stage: {}", stage.display_name());

        let (next, steps) = apply(df).map_err(|e| e.in_stage(stage))?;
        for step in &steps {
            debug!("  {}", step);
        }

        let report = StageReport::new(stage, df, &next, steps);
        let message = match report.steps.last() {
            Some(step) if report.steps.len() == 1 => step.clone(),
            Some(_) => format!("{} changes", report.steps.len()),
            None => "No changes".to_string(),
        };
        self.report_progress(ProgressUpdate::new(stage, 1.0, message).with_shape(next.shape()));

        reports.push(report);
        Ok(next)
    }
}

/// Builder for creating a [`Pipeline`] with custom configuration.
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
    progress_reporter: Option<Arc<dyn ProgressReporter>>,
}

// Ensure PipelineBuilder is Send (can be moved to another thread during construction)
static_assertions::assert_impl_all!(PipelineBuilder: Send);

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a progress reporter for receiving updates during processing.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use sales_cleaning::{ProgressReporter, ProgressUpdate};
    /// use std::sync::Arc;
    ///
    /// struct MyReporter;
    ///
    /// impl ProgressReporter for MyReporter {
    ///     fn report(&self, update: ProgressUpdate) {
    ///         println!("{}: {}", update.stage.display_name(), update.message);
    ///     }
    /// }
    ///
    /// let pipeline = Pipeline::builder()
    ///     .progress_reporter(Arc::new(MyReporter))
    ///     .build()?;
    /// ```
    pub fn progress_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    /// Set a progress callback closure.
    ///
    /// This is a convenience method for simple progress handling.
    /// For more complex scenarios, use [`progress_reporter`](Self::progress_reporter).
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressUpdate) + Send + Sync + 'static,
    {
        self.progress_reporter = Some(Arc::new(ClosureProgressReporter::new(callback)));
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        Ok(Pipeline {
            filler: MissingValueFiller::new(config.empty_column_policy),
            coercer: TypeCoercer::new(&config.date_column, config.numeric_columns.clone()),
            deduplicator: Deduplicator::new(),
            outlier_filter: OutlierFilter::new(
                config.numeric_columns.clone(),
                config.zscore_threshold,
            ),
            text_normalizer: TextNormalizer::new(config.text_columns.clone()),
            feature_deriver: FeatureDeriver::new(
                &config.quantity_column,
                &config.unit_price_column,
                &config.date_column,
            ),
            progress_reporter: self.progress_reporter,
            config,
        })
    }
}

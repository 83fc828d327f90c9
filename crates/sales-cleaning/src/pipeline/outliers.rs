//! Outlier handling module.
//!
//! Removes rows whose value in a numeric column lies more than
//! `threshold` standard deviations from the column mean.

use crate::error::{CleaningError, Result};
use crate::utils::{has_column, is_numeric_dtype};
use polars::prelude::*;
use tracing::debug;

/// Z-score row filter over a list of numeric columns.
///
/// Columns are processed in order and each one sees the table already
/// shrunk by the previous ones, so statistics are recomputed per column.
#[derive(Debug, Clone)]
pub struct OutlierFilter {
    columns: Vec<String>,
    threshold: f64,
}

impl OutlierFilter {
    pub fn new(columns: Vec<String>, threshold: f64) -> Self {
        Self { columns, threshold }
    }

    /// Filter outlier rows out of `df`.
    ///
    /// A missing cell in a filtered column fails the test. A column with zero
    /// spread is skipped. When the spread is undefined (fewer than two values)
    /// no row passes.
    ///
    /// # Errors
    ///
    /// [`CleaningError::TypeMismatch`] when a configured column is present
    /// but not numeric.
    pub fn apply(&self, df: &DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let original_rows = df.height();
        let mut df = df.clone();
        let mut processing_steps = Vec::new();

        for col_name in &self.columns {
            if !has_column(&df, col_name) {
                debug!("Outlier column '{}' not present, skipping", col_name);
                continue;
            }

            let series = df.column(col_name)?.as_materialized_series().clone();
            if !is_numeric_dtype(series.dtype()) {
                return Err(CleaningError::type_mismatch(
                    col_name,
                    "numeric",
                    series.dtype(),
                ));
            }

            let float_series = series.cast(&DataType::Float64)?;
            let f64_chunked = float_series.f64()?;

            let mask_values: Vec<bool> = match (f64_chunked.mean(), f64_chunked.std(1)) {
                (_, Some(std)) if std == 0.0 => {
                    debug!("Column '{}' is constant, skipping", col_name);
                    continue;
                }
                (Some(mean), Some(std)) => {
                    debug!("Column '{}': mean {:.2}, std {:.2}", col_name, mean, std);
                    let limit = self.threshold * std;
                    f64_chunked
                        .into_iter()
                        .map(|opt_val| opt_val.is_some_and(|val| (val - mean).abs() <= limit))
                        .collect()
                }
                _ => {
                    debug!("Column '{}' has fewer than two values, no row passes", col_name);
                    vec![false; f64_chunked.len()]
                }
            };

            let before = df.height();
            let mask = BooleanChunked::from_slice("mask".into(), &mask_values);
            df = df.filter(&mask)?;

            let removed = before - df.height();
            if removed > 0 {
                debug!("Column '{}': removed {} rows", col_name, removed);
                processing_steps.push(format!(
                    "Removed {} outlier rows by '{}' (|z| > {})",
                    removed, col_name, self.threshold
                ));
            }
        }

        let rows_removed = original_rows - df.height();
        if rows_removed > 0 {
            debug!("Removed {} outlier rows", rows_removed);
        }

        Ok((df, processing_steps))
    }
}

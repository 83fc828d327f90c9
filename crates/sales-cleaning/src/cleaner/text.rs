//! Text column normalization.

use crate::error::Result;
use crate::utils::has_column;
use polars::prelude::*;
use tracing::debug;

/// Trims and lowercases the configured text columns.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    columns: Vec<String>,
}

impl TextNormalizer {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Normalize every configured column that is present and holds strings.
    ///
    /// Null cells pass through; columns of any other dtype are left alone.
    pub fn apply(&self, df: &DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut df = df.clone();
        let mut steps = Vec::new();

        for col_name in &self.columns {
            if !has_column(&df, col_name) {
                debug!("Text column '{}' not present, skipping", col_name);
                continue;
            }

            let series = df.column(col_name)?.as_materialized_series().clone();
            if series.dtype() != &DataType::String {
                debug!(
                    "Text column '{}' has dtype {}, skipping",
                    col_name,
                    series.dtype()
                );
                continue;
            }

            let normalized: Vec<Option<String>> = series
                .str()?
                .into_iter()
                .map(|v| v.map(|s| s.trim().to_lowercase()))
                .collect();
            df.with_column(Series::new(series.name().clone(), normalized))?;
            steps.push(format!("Normalized text in '{}'", col_name));
        }

        Ok((df, steps))
    }
}

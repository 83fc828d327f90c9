//! Statistical imputation of missing values.
//!
//! Numeric columns are filled with their median, text columns with their
//! mode. Every other column class is left alone.

use crate::config::EmptyColumnPolicy;
use crate::error::{CleaningError, Result};
use crate::utils::{
    DtypeCategory, fill_integer_nulls, fill_numeric_nulls, fill_string_nulls, get_dtype_category,
    is_integer_dtype, string_mode,
};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Fills missing numeric cells with the median and missing text cells with the mode.
#[derive(Debug, Clone, Default)]
pub struct MissingValueFiller {
    empty_column_policy: EmptyColumnPolicy,
}

impl MissingValueFiller {
    /// Create a filler with the given handling of all-missing columns.
    pub fn new(empty_column_policy: EmptyColumnPolicy) -> Self {
        Self {
            empty_column_policy,
        }
    }

    /// Impute every numeric and text column of `df` that has missing cells.
    ///
    /// Returns the filled table and one step message per filled column.
    pub fn apply(&self, df: &DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut df = df.clone();
        let mut processing_steps = Vec::new();

        let col_names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
        for col_name in &col_names {
            let column = df.column(col_name)?;
            let missing = column.null_count();
            if missing == 0 {
                continue;
            }

            let series = column.as_materialized_series().clone();
            let filled = match get_dtype_category(series.dtype()) {
                DtypeCategory::Numeric => self.fill_numeric(&series, &mut processing_steps)?,
                DtypeCategory::String => self.fill_text(&series, &mut processing_steps)?,
                other => {
                    debug!("Leaving '{}' ({:?}) untouched", col_name, other);
                    None
                }
            };

            if let Some(filled) = filled {
                debug!("Imputed {} missing values in '{}'", missing, col_name);
                df.with_column(filled)?;
            }
        }

        info!("Imputation filled {} columns", processing_steps.len());
        Ok((df, processing_steps))
    }

    /// Median-fill a numeric column. Integer columns keep their dtype when the median is whole.
    fn fill_numeric(
        &self,
        series: &Series,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<Series>> {
        let Some(median) = series.median() else {
            return self.handle_empty_column(series.name());
        };

        let filled = if is_integer_dtype(series.dtype()) && median.fract() == 0.0 {
            fill_integer_nulls(series, median as i64)?
        } else {
            fill_numeric_nulls(series, median)?
        };

        processing_steps.push(format!(
            "Filled '{}' with median: {:.2} ({} values)",
            series.name(),
            median,
            series.null_count()
        ));
        Ok(Some(filled))
    }

    /// Mode-fill a text column.
    fn fill_text(
        &self,
        series: &Series,
        processing_steps: &mut Vec<String>,
    ) -> Result<Option<Series>> {
        let as_string = series.cast(&DataType::String)?;
        let Some(mode) = string_mode(&as_string) else {
            return self.handle_empty_column(series.name());
        };

        let filled = fill_string_nulls(&as_string, &mode)?;
        processing_steps.push(format!(
            "Filled '{}' with mode: '{}' ({} values)",
            series.name(),
            mode,
            series.null_count()
        ));
        Ok(Some(filled))
    }

    fn handle_empty_column(&self, name: &PlSmallStr) -> Result<Option<Series>> {
        match self.empty_column_policy {
            EmptyColumnPolicy::Skip => {
                warn!(
                    "Column '{}' has no non-missing values; leaving it unchanged",
                    name
                );
                Ok(None)
            }
            EmptyColumnPolicy::Fail => Err(CleaningError::EmptyColumn(name.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_at(df: &DataFrame, col: &str, idx: usize) -> f64 {
        df.column(col).unwrap().get(idx).unwrap().try_extract::<f64>().unwrap()
    }

    fn str_at(df: &DataFrame, col: &str, idx: usize) -> String {
        df.column(col)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .get(idx)
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_numeric_median_fill() {
        let df = df![
            "UnitPrice" => [Some(1.0), None, Some(3.0), None, Some(5.0)],
        ]
        .unwrap();

        let (filled, steps) = MissingValueFiller::default().apply(&df).unwrap();

        assert_eq!(filled.column("UnitPrice").unwrap().null_count(), 0);
        assert_eq!(f64_at(&filled, "UnitPrice", 1), 3.0);
        assert_eq!(f64_at(&filled, "UnitPrice", 3), 3.0);
        assert_eq!(f64_at(&filled, "UnitPrice", 4), 5.0);
        assert!(steps[0].contains("median"));
    }

    #[test]
    fn test_integer_column_keeps_dtype_with_whole_median() {
        let df = df!["Quantity" => [Some(1_i64), Some(3), None]].unwrap();

        let (filled, _) = MissingValueFiller::default().apply(&df).unwrap();
        let quantity = filled.column("Quantity").unwrap();

        assert_eq!(quantity.dtype(), &DataType::Int64);
        assert_eq!(quantity.get(2).unwrap().try_extract::<i64>().unwrap(), 2);
    }

    #[test]
    fn test_integer_column_becomes_float_with_fractional_median() {
        let df = df!["Quantity" => [Some(1_i64), Some(2), None]].unwrap();

        let (filled, _) = MissingValueFiller::default().apply(&df).unwrap();

        assert_eq!(filled.column("Quantity").unwrap().dtype(), &DataType::Float64);
        assert_eq!(f64_at(&filled, "Quantity", 2), 1.5);
    }

    #[test]
    fn test_text_mode_fill() {
        let df = df![
            "Category" => [Some("Books"), None, Some("Toys"), Some("Books")],
        ]
        .unwrap();

        let (filled, steps) = MissingValueFiller::default().apply(&df).unwrap();

        assert_eq!(filled.column("Category").unwrap().null_count(), 0);
        assert_eq!(str_at(&filled, "Category", 1), "Books");
        assert!(steps[0].contains("mode"));
    }

    #[test]
    fn test_text_mode_tie_break_is_deterministic() {
        let df = df![
            "Category" => [Some("Toys"), Some("Books"), None],
        ]
        .unwrap();

        let (filled, _) = MissingValueFiller::default().apply(&df).unwrap();
        assert_eq!(str_at(&filled, "Category", 2), "Books");
    }

    #[test]
    fn test_non_numeric_non_text_columns_untouched() {
        let df = df![
            "Flag" => [Some(true), None, Some(false)],
            "Price" => [Some(2.0), Some(4.0), None],
        ]
        .unwrap();

        let (filled, steps) = MissingValueFiller::default().apply(&df).unwrap();

        assert_eq!(filled.column("Flag").unwrap().null_count(), 1);
        assert_eq!(filled.column("Price").unwrap().null_count(), 0);
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_input_table_is_not_mutated() {
        let df = df!["Price" => [Some(2.0), None]].unwrap();
        let _ = MissingValueFiller::default().apply(&df).unwrap();
        assert_eq!(df.column("Price").unwrap().null_count(), 1);
    }

    #[test]
    fn test_all_missing_column_skipped_by_default() {
        let df = df![
            "Discount" => [Option::<f64>::None, None],
            "Price" => [Some(2.0), None],
        ]
        .unwrap();

        let (filled, steps) = MissingValueFiller::default().apply(&df).unwrap();

        assert_eq!(filled.column("Discount").unwrap().null_count(), 2);
        assert_eq!(filled.column("Price").unwrap().null_count(), 0);
        assert_eq!(steps.len(), 1);
    }

    #[test]
    fn test_all_missing_column_fails_with_fail_policy() {
        let df = df!["Notes" => [Option::<&str>::None, None]].unwrap();

        let err = MissingValueFiller::new(EmptyColumnPolicy::Fail)
            .apply(&df)
            .unwrap_err();

        assert!(matches!(err, CleaningError::EmptyColumn(ref name) if name == "Notes"));
    }

    #[test]
    fn test_no_missing_values_no_steps() {
        let df = df![
            "Price" => [1.0, 2.0],
            "Category" => ["a", "b"],
        ]
        .unwrap();

        let (filled, steps) = MissingValueFiller::default().apply(&df).unwrap();
        assert!(steps.is_empty());
        assert!(filled.equals_missing(&df));
    }
}

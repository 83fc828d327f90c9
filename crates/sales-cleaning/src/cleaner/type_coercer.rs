//! Type coercion for the date and numeric columns.

use super::converters::{string_to_float, to_datetime};
use crate::error::{CleaningError, Result};
use crate::utils::{has_column, is_numeric_dtype};
use polars::prelude::*;
use tracing::{debug, info};

/// Parses the date column to `Datetime(ms)` and the numeric columns to numbers.
///
/// Cells that cannot be converted become null. Absent columns are skipped.
#[derive(Debug, Clone)]
pub struct TypeCoercer {
    date_column: String,
    numeric_columns: Vec<String>,
}

impl TypeCoercer {
    pub fn new(date_column: impl Into<String>, numeric_columns: Vec<String>) -> Self {
        Self {
            date_column: date_column.into(),
            numeric_columns,
        }
    }

    /// Coerce the configured columns of `df`.
    ///
    /// # Errors
    ///
    /// [`CleaningError::TypeMismatch`] when a numeric column holds a dtype
    /// that has no numeric reading (for example a list or a datetime).
    pub fn apply(&self, df: &DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut df = df.clone();
        let mut correction_steps = Vec::new();

        if has_column(&df, &self.date_column) {
            let series = df.column(&self.date_column)?.as_materialized_series().clone();
            let converted = to_datetime(&series)?;
            correction_steps.push(conversion_step(&series, &converted, "datetime"));
            df.with_column(converted)?;
        } else {
            debug!("Date column '{}' not present, skipping", self.date_column);
        }

        for col_name in &self.numeric_columns {
            if !has_column(&df, col_name) {
                debug!("Numeric column '{}' not present, skipping", col_name);
                continue;
            }

            let series = df.column(col_name)?.as_materialized_series().clone();
            let dtype = series.dtype().clone();
            let converted = if is_numeric_dtype(&dtype) {
                debug!("Column '{}' already numeric ({})", col_name, dtype);
                continue;
            } else if dtype == DataType::Boolean {
                series.cast(&DataType::Float64)?
            } else if dtype == DataType::String {
                string_to_float(&series)?
            } else {
                return Err(CleaningError::type_mismatch(col_name, "numeric", &dtype));
            };

            correction_steps.push(conversion_step(&series, &converted, "numeric"));
            df.with_column(converted)?;
        }

        info!("Type coercion touched {} columns", correction_steps.len());
        Ok((df, correction_steps))
    }
}

fn conversion_step(before: &Series, after: &Series, target: &str) -> String {
    let invalidated = after.null_count().saturating_sub(before.null_count());
    if invalidated > 0 {
        debug!(
            "Column '{}': {} values could not be converted to {}",
            before.name(),
            invalidated,
            target
        );
        format!(
            "Converted '{}' to {} ({} invalid values set to null)",
            before.name(),
            target,
            invalidated
        )
    } else {
        format!("Converted '{}' to {}", before.name(), target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::converters::datetime_dtype;

    fn coercer() -> TypeCoercer {
        TypeCoercer::new(
            "OrderDate",
            vec!["UnitPrice".into(), "Quantity".into(), "TotalAmount".into()],
        )
    }

    #[test]
    fn test_string_columns_are_parsed() {
        let df = df![
            "OrderDate" => ["2024-03-15", "03/16/2024", "soon"],
            "UnitPrice" => ["10.5", "abc", " 7 "],
            "Quantity" => [1_i64, 2, 3],
        ]
        .unwrap();

        let (coerced, steps) = coercer().apply(&df).unwrap();

        let date = coerced.column("OrderDate").unwrap();
        assert_eq!(date.dtype(), &datetime_dtype());
        assert_eq!(date.null_count(), 1);

        let price = coerced.column("UnitPrice").unwrap();
        assert_eq!(price.dtype(), &DataType::Float64);
        let values: Vec<Option<f64>> = price
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(values, vec![Some(10.5), None, Some(7.0)]);

        // Quantity was already numeric
        assert_eq!(coerced.column("Quantity").unwrap().dtype(), &DataType::Int64);
        assert_eq!(steps.len(), 2);
        assert!(steps[1].contains("1 invalid"));
    }

    #[test]
    fn test_boolean_becomes_float() {
        let df = df!["TotalAmount" => [true, false]].unwrap();
        let (coerced, _) = coercer().apply(&df).unwrap();

        let total = coerced.column("TotalAmount").unwrap();
        assert_eq!(total.dtype(), &DataType::Float64);
        assert_eq!(total.get(0).unwrap().try_extract::<f64>().unwrap(), 1.0);
        assert_eq!(total.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0);
    }

    #[test]
    fn test_unsupported_numeric_dtype_is_type_mismatch() {
        let dates = Series::new("UnitPrice".into(), &[19797_i32])
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![dates.into()]).unwrap();

        let err = coercer().apply(&df).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_absent_columns_are_skipped() {
        let df = df!["CustomerName" => ["alice"]].unwrap();
        let (coerced, steps) = coercer().apply(&df).unwrap();

        assert!(coerced.equals_missing(&df));
        assert!(steps.is_empty());
    }

    #[test]
    fn test_existing_nulls_are_not_counted_as_invalid() {
        let df = df!["UnitPrice" => [Some("1.0"), None]].unwrap();
        let (_, steps) = coercer().apply(&df).unwrap();
        assert_eq!(steps, vec!["Converted 'UnitPrice' to numeric".to_string()]);
    }
}

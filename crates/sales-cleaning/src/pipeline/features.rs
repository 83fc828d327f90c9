//! Derived columns.
//!
//! `ComputedTotal` from quantity and unit price, `Year` and `Month` from the
//! order date. Source columns and rows are never changed.

use crate::cleaner::converters::year_and_month;
use crate::error::{CleaningError, Result};
use crate::utils::has_column;
use polars::prelude::*;
use tracing::debug;

/// Name of the quantity × unit price column.
pub const COMPUTED_TOTAL: &str = "ComputedTotal";
/// Name of the calendar year column.
pub const YEAR: &str = "Year";
/// Name of the calendar month column (1-12).
pub const MONTH: &str = "Month";

/// Adds `ComputedTotal`, `Year` and `Month` when their source columns exist.
#[derive(Debug, Clone)]
pub struct FeatureDeriver {
    quantity_column: String,
    unit_price_column: String,
    date_column: String,
}

impl FeatureDeriver {
    pub fn new(
        quantity_column: impl Into<String>,
        unit_price_column: impl Into<String>,
        date_column: impl Into<String>,
    ) -> Self {
        Self {
            quantity_column: quantity_column.into(),
            unit_price_column: unit_price_column.into(),
            date_column: date_column.into(),
        }
    }

    /// Add the derived columns to `df`, replacing any of the same name.
    ///
    /// # Errors
    ///
    /// [`CleaningError::TypeMismatch`] when the date column is present but is
    /// not a date or datetime.
    pub fn apply(&self, df: &DataFrame) -> Result<(DataFrame, Vec<String>)> {
        let mut df = df.clone();
        let mut steps = Vec::new();

        if has_column(&df, &self.quantity_column) && has_column(&df, &self.unit_price_column) {
            let total = self.computed_total(&df)?;
            df.with_column(total)?;
            steps.push(format!(
                "Derived '{}' = '{}' x '{}'",
                COMPUTED_TOTAL, self.quantity_column, self.unit_price_column
            ));
        } else {
            debug!("Quantity or unit price missing, '{}' not derived", COMPUTED_TOTAL);
        }

        if has_column(&df, &self.date_column) {
            let dates = df.column(&self.date_column)?.as_materialized_series().clone();
            if !matches!(dates.dtype(), DataType::Datetime(_, _) | DataType::Date) {
                return Err(CleaningError::type_mismatch(
                    &self.date_column,
                    "datetime",
                    dates.dtype(),
                ));
            }

            let (years, months) = year_and_month(&dates)?;
            df.with_column(Series::new(YEAR.into(), years))?;
            df.with_column(Series::new(MONTH.into(), months))?;
            steps.push(format!(
                "Derived '{}' and '{}' from '{}'",
                YEAR, MONTH, self.date_column
            ));
        } else {
            debug!("Date column '{}' missing, calendar fields not derived", self.date_column);
        }

        Ok((df, steps))
    }

    fn computed_total(&self, df: &DataFrame) -> Result<Series> {
        let quantity = df
            .column(&self.quantity_column)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let unit_price = df
            .column(&self.unit_price_column)?
            .as_materialized_series()
            .cast(&DataType::Float64)?;

        let totals: Vec<Option<f64>> = quantity
            .f64()?
            .into_iter()
            .zip(unit_price.f64()?)
            .map(|(q, p)| Some(q? * p?))
            .collect();

        Ok(Series::new(COMPUTED_TOTAL.into(), totals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::converters::datetime_dtype;
    use pretty_assertions::assert_eq;

    fn deriver() -> FeatureDeriver {
        FeatureDeriver::new("Quantity", "UnitPrice", "OrderDate")
    }

    fn order_dates(values: &[Option<&str>]) -> Series {
        let millis: Vec<Option<i64>> = values
            .iter()
            .map(|v| {
                v.map(|s| {
                    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .unwrap()
                        .and_hms_opt(0, 0, 0)
                        .unwrap()
                        .and_utc()
                        .timestamp_millis()
                })
            })
            .collect();
        Series::new("OrderDate".into(), millis)
            .cast(&datetime_dtype())
            .unwrap()
    }

    #[test]
    fn test_computed_total() {
        let df = df![
            "Quantity" => [Some(2_i64), None, Some(3)],
            "UnitPrice" => [Some(10.5), Some(1.0), Some(0.5)],
        ]
        .unwrap();

        let (derived, steps) = deriver().apply(&df).unwrap();
        let totals: Vec<Option<f64>> = derived
            .column(COMPUTED_TOTAL)
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect();

        assert_eq!(totals, vec![Some(21.0), None, Some(1.5)]);
        assert_eq!(steps.len(), 1);
        // Source columns untouched
        assert_eq!(derived.column("Quantity").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_year_and_month() {
        let dates = order_dates(&[Some("2024-03-15"), None, Some("2023-12-01")]);
        let df = DataFrame::new(vec![dates.into()]).unwrap();

        let (derived, _) = deriver().apply(&df).unwrap();

        let years: Vec<Option<i32>> =
            derived.column(YEAR).unwrap().i32().unwrap().into_iter().collect();
        let months: Vec<Option<i32>> =
            derived.column(MONTH).unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(years, vec![Some(2024), None, Some(2023)]);
        assert_eq!(months, vec![Some(3), None, Some(12)]);
        assert!(!has_column(&derived, COMPUTED_TOTAL));
    }

    #[test]
    fn test_existing_derived_columns_are_replaced() {
        let df = df![
            "Quantity" => [2.0],
            "UnitPrice" => [4.0],
            "ComputedTotal" => ["stale"],
        ]
        .unwrap();

        let (derived, _) = deriver().apply(&df).unwrap();
        assert_eq!(derived.width(), 3);
        assert_eq!(
            derived.column(COMPUTED_TOTAL).unwrap().f64().unwrap().get(0),
            Some(8.0)
        );
    }

    #[test]
    fn test_string_date_is_type_mismatch() {
        let df = df!["OrderDate" => ["2024-03-15"]].unwrap();
        let err = deriver().apply(&df).unwrap_err();
        assert_eq!(err.error_code(), "TYPE_MISMATCH");
    }

    #[test]
    fn test_rows_never_removed() {
        let df = df![
            "Quantity" => [Option::<f64>::None, None],
            "UnitPrice" => [Option::<f64>::None, None],
        ]
        .unwrap();
        let (derived, _) = deriver().apply(&df).unwrap();
        assert_eq!(derived.height(), 2);
        assert_eq!(derived.column(COMPUTED_TOTAL).unwrap().null_count(), 2);
    }
}

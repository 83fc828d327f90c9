//! Type conversion functions for data cleaning.
//!
//! Every converter is cell-tolerant: a value that does not parse becomes null
//! instead of failing the whole column.

use crate::error::Result;
use crate::utils::parse_finite_f64;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;

/// Date-time layouts tried in order after RFC 3339.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only layouts, interpreted as midnight.
const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y", "%Y%m%d"];

/// The datetime dtype produced by [`to_datetime`].
pub(crate) fn datetime_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

/// Parse one date or date-time string into epoch milliseconds.
pub(crate) fn parse_datetime_millis(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.timestamp_millis());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    None
}

/// Convert a series to `Datetime(ms)`.
///
/// Datetime and Date series are cast; anything else is rendered as text and
/// parsed cell by cell, with unparseable cells becoming null.
pub(crate) fn to_datetime(series: &Series) -> Result<Series> {
    match series.dtype() {
        DataType::Datetime(_, _) | DataType::Date => Ok(series.cast(&datetime_dtype())?),
        _ => {
            let as_string = series.cast(&DataType::String)?;
            let str_series = as_string.str()?;
            let millis: Vec<Option<i64>> = str_series
                .into_iter()
                .map(|v| v.and_then(parse_datetime_millis))
                .collect();

            Ok(Series::new(series.name().clone(), millis).cast(&datetime_dtype())?)
        }
    }
}

/// Convert a string series to Float64, nulling cells that are not finite numbers.
pub(crate) fn string_to_float(series: &Series) -> Result<Series> {
    let str_series = series.str()?;
    let values: Vec<Option<f64>> = str_series
        .into_iter()
        .map(|v| v.and_then(parse_finite_f64))
        .collect();

    Ok(Series::new(series.name().clone(), values))
}

/// Calendar year and month of each value of a `Datetime`/`Date` series.
pub(crate) fn year_and_month(series: &Series) -> Result<(Vec<Option<i32>>, Vec<Option<i32>>)> {
    use chrono::Datelike;

    let millis_series = series.cast(&datetime_dtype())?.cast(&DataType::Int64)?;
    let millis = millis_series.i64()?;

    let mut years = Vec::with_capacity(millis.len());
    let mut months = Vec::with_capacity(millis.len());
    for value in millis.into_iter() {
        let date = value.and_then(DateTime::from_timestamp_millis);
        years.push(date.map(|d| d.year()));
        months.push(date.map(|d| d.month() as i32));
    }

    Ok((years, months))
}

//! CSV loading.
//!
//! Reads the raw sales file into a [`DataFrame`]. The usual missing-value
//! markers are read as nulls, so columns holding numbers and markers are
//! still inferred as numeric.

use crate::error::{CleaningError, Result};
use crate::utils::NA_MARKERS;
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

/// Load a CSV file with a header row.
///
/// # Errors
///
/// - [`CleaningError::Io`] when the file cannot be opened.
/// - [`CleaningError::Parse`] when the content is not valid tabular data.
/// - [`CleaningError::EmptyDataset`] when no rows or no columns were read.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    info!("Loading dataset from: {}", path.display());

    // Surface unreadable paths as IO errors before polars wraps them.
    std::fs::File::open(path)?;

    let df = read_with_fallbacks(path)?;
    let df = nan_to_null(df)?;

    if df.width() == 0 {
        return Err(CleaningError::EmptyDataset(format!(
            "no columns in {}",
            path.display()
        )));
    }
    if df.height() == 0 {
        return Err(CleaningError::EmptyDataset(format!(
            "no data rows in {}",
            path.display()
        )));
    }

    info!("Loaded dataset with shape: {:?}", df.shape());
    Ok(df)
}

/// Parse CSV text held in memory with the same options as [`load_csv`].
pub fn read_csv_str(content: &str) -> Result<DataFrame> {
    let df = read_options(CsvParseOptions::default())
        .into_reader_with_file_handle(Cursor::new(content.as_bytes().to_vec()))
        .finish()
        .map_err(|e| CleaningError::Parse(e.to_string()))?;
    nan_to_null(df)
}

/// Header row, full-file schema inference and the missing markers as nulls.
fn read_options(parse_options: CsvParseOptions) -> CsvReadOptions {
    let null_values = NA_MARKERS.iter().map(|m| PlSmallStr::from_str(m)).collect();
    CsvReadOptions::default()
        .with_infer_schema_length(None)
        .with_has_header(true)
        .with_parse_options(
            parse_options.with_null_values(Some(NullValues::AllColumns(null_values))),
        )
}

/// Load CSV with a fallback for files with broken quoting.
fn read_with_fallbacks(path: &Path) -> Result<DataFrame> {
    // Strategy 1: Standard loading with quote handling
    let standard = read_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish());

    match standard {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard loading failed: {}", e),
    }

    // Strategy 2: Pre-clean content
    let content = std::fs::read_to_string(path)?;
    let cleaned = clean_csv_content(&content);

    read_options(CsvParseOptions::default())
        .into_reader_with_file_handle(Cursor::new(cleaned.into_bytes()))
        .finish()
        .map_err(|e| CleaningError::Parse(e.to_string()))
}

/// Collapse doubled/tripled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace NaN with null in float columns.
fn nan_to_null(mut df: DataFrame) -> Result<DataFrame> {
    let float_columns: Vec<PlSmallStr> = df
        .get_columns()
        .iter()
        .filter(|c| matches!(c.dtype(), DataType::Float32 | DataType::Float64))
        .map(|c| c.name().clone())
        .collect();

    for name in float_columns {
        let floats = df
            .column(name.as_str())?
            .as_materialized_series()
            .cast(&DataType::Float64)?;
        let values = floats.f64()?;
        let nan_mask = values.is_nan();
        if !nan_mask.any() {
            continue;
        }
        debug!("Column '{}': NaN read as missing", name);
        df.with_column(values.set(&nan_mask, None)?.into_series())?;
    }

    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_csv_basic() {
        let file = write_temp_csv("OrderID,UnitPrice,Category\n1,10.5,Books\n2,3.25,Toys\n");
        let df = load_csv(file.path()).unwrap();

        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("UnitPrice").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("Category").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_load_csv_missing_file_is_io_error() {
        let err = load_csv("/definitely/not/here/raw_sales.csv").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_load_csv_header_only_is_empty_dataset() {
        let file = write_temp_csv("OrderID,UnitPrice\n");
        let err = load_csv(file.path()).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_DATASET");
    }

    #[test]
    fn test_empty_file_is_rejected() {
        let file = write_temp_csv("");
        let err = load_csv(file.path()).unwrap_err();
        assert!(
            matches!(err.error_code(), "PARSE_ERROR" | "EMPTY_DATASET"),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn test_markers_become_null_and_column_stays_numeric() {
        let df = read_csv_str("Quantity,Category\n3,Books\nNA,N/A\n5,\n").unwrap();

        let quantity = df.column("Quantity").unwrap();
        assert_eq!(quantity.dtype(), &DataType::Int64);
        assert_eq!(quantity.null_count(), 1);

        let category = df.column("Category").unwrap();
        assert_eq!(category.dtype(), &DataType::String);
        assert_eq!(category.null_count(), 2);
    }

    #[test]
    fn test_float_column_with_marker() {
        let df = read_csv_str("UnitPrice\n10.5\nnull\n7\n").unwrap();
        let price = df.column("UnitPrice").unwrap();
        assert_eq!(price.dtype(), &DataType::Float64);
        assert_eq!(price.null_count(), 1);
        assert_eq!(price.get(2).unwrap().try_extract::<f64>().unwrap(), 7.0);
    }

    #[test]
    fn test_mixed_column_stays_string() {
        let df = read_csv_str("UnitPrice\n10\nabc\n12\n").unwrap();
        let price = df.column("UnitPrice").unwrap();
        assert_eq!(price.dtype(), &DataType::String);
        assert_eq!(price.null_count(), 0);
    }

    #[test]
    fn test_clean_csv_content() {
        let cleaned = clean_csv_content("a,b\n\n\"\"x\"\",1\n   \n");
        assert_eq!(cleaned, "a,b\n\"x\",1");
    }
}

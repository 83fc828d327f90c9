//! CSV writing.

use crate::error::{Result, ResultExt};
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write a DataFrame to a CSV file with a header row and no index column.
///
/// The data is written to a sibling temporary file which is then renamed over
/// `path`, so a failure part-way through never leaves a truncated file at the
/// destination. An existing file at `path` is replaced.
pub fn write_csv(df: &DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    info!("Saving cleaned dataset to: {}", path.display());

    let tmp_path = temp_path_for(path);
    let written = write_to(df, &tmp_path).and_then(|()| Ok(fs::rename(&tmp_path, path)?));

    if written.is_err() {
        // best effort; the original error is what matters
        let _ = fs::remove_file(&tmp_path);
    }
    written?;

    info!("Cleaned dataset saved: {} rows x {} columns", df.height(), df.width());
    Ok(())
}

fn write_to(df: &DataFrame, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    let mut df = df.clone();

    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .with_quote_char(b'"')
        .finish(&mut df)
        .context(format!("Failed to write CSV to {}", path.display()))?;

    file.sync_all()?;
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output.csv".to_string());
    path.with_file_name(format!(".{}.tmp", file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::reader::load_csv;

    #[test]
    fn test_write_csv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned.csv");

        let df = df![
            "Category" => ["books", "toys"],
            "UnitPrice" => [10.5, 3.0],
            "Year" => [Some(2024), None],
        ]
        .unwrap();

        write_csv(&df, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next(), Some("Category,UnitPrice,Year"));
        assert_eq!(lines.next(), Some("books,10.5,2024"));

        let loaded = load_csv(&path).unwrap();
        assert_eq!(loaded.shape(), (2, 3));
        assert_eq!(loaded.column("Year").unwrap().null_count(), 1);
    }

    #[test]
    fn test_write_csv_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned.csv");
        std::fs::write(&path, "stale,content\n1,2\n3,4\n5,6\n").unwrap();

        let df = df!["a" => [1]].unwrap();
        write_csv(&df, &path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\n1\n");
        assert!(!temp_path_for(&path).exists());
    }

    #[test]
    fn test_write_csv_unwritable_destination_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_dir").join("cleaned.csv");

        let df = df!["a" => [1]].unwrap();
        let err = write_csv(&df, &path).unwrap_err();

        assert_eq!(err.error_code(), "IO_ERROR");
        assert!(!path.exists());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let tmp = temp_path_for(Path::new("/data/out/cleaned.csv"));
        assert_eq!(tmp, PathBuf::from("/data/out/.cleaned.csv.tmp"));
    }
}

//! Reading and writing CSV files.

pub mod reader;
pub mod writer;

pub use reader::{load_csv, read_csv_str};
pub use writer::write_csv;

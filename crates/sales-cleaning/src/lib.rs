//! E-commerce Sales Cleaning Library
//!
//! A batch cleaning pipeline for raw e-commerce sales exports, built with Rust and Polars.
//!
//! # Overview
//!
//! A raw CSV goes through a fixed sequence of stages and is written back as a
//! cleaned CSV:
//!
//! - **Loading**: CSV reading with missing-marker normalization
//! - **Imputation**: median for numeric columns, mode for text columns
//! - **Type Coercion**: order date to datetime, price/quantity/amount to numbers
//! - **Deduplication**: exact-duplicate rows removed, first occurrence kept
//! - **Outlier Filtering**: z-score row filter over the numeric columns
//! - **Text Normalization**: names and categories trimmed and lowercased
//! - **Feature Derivation**: `ComputedTotal`, `Year` and `Month`
//! - **Progress Reporting**: per-stage updates through a callback
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use sales_cleaning::{Pipeline, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .input_path("data/raw_ecommerce_sales.csv")
//!     .output_path("data/cleaned_ecommerce_sales.csv")
//!     .zscore_threshold(3.0)
//!     .build()?;
//!
//! let result = Pipeline::builder()
//!     .config(config)
//!     .on_progress(|update| {
//!         println!("[{:.0}%] {}", update.progress * 100.0, update.message);
//!     })
//!     .build()?
//!     .run()?;
//!
//! println!("{}", result.summary);
//! ```
//!
//! Every stage is also usable on its own; each takes a `&DataFrame` and
//! returns the new table together with a list of step descriptions:
//!
//! ```rust,ignore
//! use sales_cleaning::{Deduplicator, load_csv};
//!
//! let df = load_csv("data/raw_ecommerce_sales.csv")?;
//! let (deduped, steps) = Deduplicator::new().apply(&df)?;
//! ```

pub mod cleaner;
pub mod config;
pub mod error;
pub mod imputers;
pub mod io;
pub mod pipeline;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{Deduplicator, TextNormalizer, TypeCoercer};
pub use config::{ConfigValidationError, EmptyColumnPolicy, PipelineConfig, PipelineConfigBuilder};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use imputers::MissingValueFiller;
pub use io::{load_csv, read_csv_str, write_csv};
pub use pipeline::features::{COMPUTED_TOTAL, MONTH, YEAR};
pub use pipeline::{
    ClosureProgressReporter, FeatureDeriver, OutlierFilter, Pipeline, PipelineBuilder,
    PipelineStage, ProgressReporter, ProgressUpdate, TracingProgressReporter,
};
pub use types::{CleaningSummary, PipelineResult, StageReport};
pub use utils::{DtypeCategory, get_dtype_category, is_numeric_dtype};

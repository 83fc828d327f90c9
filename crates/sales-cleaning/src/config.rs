//! Configuration types for the cleaning pipeline.
//!
//! The column lists, the z-score threshold and the file paths are plain
//! configuration values. Defaults describe the e-commerce sales schema; swap
//! them through [`PipelineConfig::builder()`] or a JSON file to run the same
//! stages over a different schema.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default input file, relative to the working directory.
pub const DEFAULT_INPUT_PATH: &str = "../data/raw_ecommerce_sales.csv";

/// Default output file, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "../data/cleaned_ecommerce_sales.csv";

/// Default z-score threshold for outlier removal.
pub const DEFAULT_ZSCORE_THRESHOLD: f64 = 3.0;

/// What the imputation stage does with a column that has no values at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmptyColumnPolicy {
    /// Leave the column unchanged (all cells stay missing) and log a warning
    #[default]
    Skip,
    /// Abort the run with an `EmptyColumn` error
    Fail,
}

/// Configuration for the cleaning pipeline.
///
/// Use [`PipelineConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use sales_cleaning::config::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .numeric_columns(["Price", "Units"])
///     .zscore_threshold(2.5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// CSV file read by [`Pipeline::run`](crate::Pipeline::run).
    /// Default: "../data/raw_ecommerce_sales.csv"
    pub input_path: PathBuf,

    /// CSV file written by [`Pipeline::run`](crate::Pipeline::run).
    /// Default: "../data/cleaned_ecommerce_sales.csv"
    pub output_path: PathBuf,

    /// Column parsed as a date-time and used for `Year`/`Month`.
    /// Default: "OrderDate"
    pub date_column: String,

    /// Columns coerced to numbers and filtered for outliers, in filter order.
    /// Default: ["UnitPrice", "Quantity", "TotalAmount"]
    pub numeric_columns: Vec<String>,

    /// Columns lowercased and trimmed.
    /// Default: ["CustomerName", "ProductName", "Category"]
    pub text_columns: Vec<String>,

    /// Quantity factor of `ComputedTotal`.
    /// Default: "Quantity"
    pub quantity_column: String,

    /// Unit-price factor of `ComputedTotal`.
    /// Default: "UnitPrice"
    pub unit_price_column: String,

    /// Rows with `|x - mean| > zscore_threshold * std` are removed.
    /// Default: 3.0
    pub zscore_threshold: f64,

    /// Handling of entirely-missing columns during imputation.
    /// Default: Skip
    pub empty_column_policy: EmptyColumnPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            date_column: "OrderDate".to_string(),
            numeric_columns: to_strings(["UnitPrice", "Quantity", "TotalAmount"]),
            text_columns: to_strings(["CustomerName", "ProductName", "Category"]),
            quantity_column: "Quantity".to_string(),
            unit_price_column: "UnitPrice".to_string(),
            zscore_threshold: DEFAULT_ZSCORE_THRESHOLD,
            empty_column_policy: EmptyColumnPolicy::default(),
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Load and validate a configuration from a JSON file.
    ///
    /// Missing fields take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !self.zscore_threshold.is_finite() || self.zscore_threshold <= 0.0 {
            return Err(ConfigValidationError::InvalidThreshold(self.zscore_threshold));
        }

        let single = [
            ("date_column", &self.date_column),
            ("quantity_column", &self.quantity_column),
            ("unit_price_column", &self.unit_price_column),
        ];
        for (field, name) in single {
            if name.trim().is_empty() {
                return Err(ConfigValidationError::EmptyColumnName(field.to_string()));
            }
        }

        for (field, names) in [
            ("numeric_columns", &self.numeric_columns),
            ("text_columns", &self.text_columns),
        ] {
            if names.iter().any(|name| name.trim().is_empty()) {
                return Err(ConfigValidationError::EmptyColumnName(field.to_string()));
            }
        }

        if self.input_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("input_path".to_string()));
        }
        if self.output_path.as_os_str().is_empty() {
            return Err(ConfigValidationError::EmptyPath("output_path".to_string()));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid z-score threshold: {0} (must be a finite number greater than 0)")]
    InvalidThreshold(f64),

    #[error("Empty column name in '{0}'")]
    EmptyColumnName(String),

    #[error("Empty path for '{0}'")]
    EmptyPath(String),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    input_path: Option<PathBuf>,
    output_path: Option<PathBuf>,
    date_column: Option<String>,
    numeric_columns: Option<Vec<String>>,
    text_columns: Option<Vec<String>>,
    quantity_column: Option<String>,
    unit_price_column: Option<String>,
    zscore_threshold: Option<f64>,
    empty_column_policy: Option<EmptyColumnPolicy>,
}

impl PipelineConfigBuilder {
    /// Set the CSV file to read.
    pub fn input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = Some(path.into());
        self
    }

    /// Set the CSV file to write.
    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Set the date-time column.
    pub fn date_column(mut self, column: impl Into<String>) -> Self {
        self.date_column = Some(column.into());
        self
    }

    /// Set the numeric columns. Their order is the outlier filter order.
    pub fn numeric_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.numeric_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the text columns to normalize.
    pub fn text_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the quantity column used for `ComputedTotal`.
    pub fn quantity_column(mut self, column: impl Into<String>) -> Self {
        self.quantity_column = Some(column.into());
        self
    }

    /// Set the unit-price column used for `ComputedTotal`.
    pub fn unit_price_column(mut self, column: impl Into<String>) -> Self {
        self.unit_price_column = Some(column.into());
        self
    }

    /// Set the z-score threshold for outlier removal.
    pub fn zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = Some(threshold);
        self
    }

    /// Set the handling of entirely-missing columns.
    pub fn empty_column_policy(mut self, policy: EmptyColumnPolicy) -> Self {
        self.empty_column_policy = Some(policy);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();
        let config = PipelineConfig {
            input_path: self.input_path.unwrap_or(defaults.input_path),
            output_path: self.output_path.unwrap_or(defaults.output_path),
            date_column: self.date_column.unwrap_or(defaults.date_column),
            numeric_columns: self.numeric_columns.unwrap_or(defaults.numeric_columns),
            text_columns: self.text_columns.unwrap_or(defaults.text_columns),
            quantity_column: self.quantity_column.unwrap_or(defaults.quantity_column),
            unit_price_column: self.unit_price_column.unwrap_or(defaults.unit_price_column),
            zscore_threshold: self.zscore_threshold.unwrap_or(defaults.zscore_threshold),
            empty_column_policy: self
                .empty_column_policy
                .unwrap_or(defaults.empty_column_policy),
        };

        config.validate()?;
        Ok(config)
    }
}

fn to_strings<const N: usize>(names: [&str; N]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

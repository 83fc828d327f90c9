//! Custom error types for the cleaning pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Every stage
//! returns [`CleaningError`]; the pipeline wraps stage failures in
//! [`CleaningError::StageFailed`] so callers can tell which stage aborted
//! the run.
//!
//! Errors are serializable as `{code, message}` so they can be embedded in
//! JSON run reports.

use crate::config::ConfigValidationError;
use crate::pipeline::progress::PipelineStage;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// IO error wrapper (unreadable input, unwritable output).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The input is not valid delimited tabular data.
    #[error("Failed to parse tabular data: {0}")]
    Parse(String),

    /// The input parsed but holds no rows or no columns.
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    /// Imputation is undefined because the column has no non-missing values.
    #[error("Column '{0}' has no non-missing values; imputation is undefined")]
    EmptyColumn(String),

    /// A stage's target column holds a dtype the stage cannot work with.
    #[error("Column '{column}' has type {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        found: String,
    },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A pipeline stage failed; the run was aborted.
    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: PipelineStage,
        #[source]
        source: Box<CleaningError>,
    },

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Attribute this error to a pipeline stage.
    ///
    /// Errors already attributed to a stage are returned unchanged.
    pub fn in_stage(self, stage: PipelineStage) -> Self {
        match self {
            Self::StageFailed { .. } => self,
            other => CleaningError::StageFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Shorthand for a [`CleaningError::TypeMismatch`].
    pub fn type_mismatch(
        column: impl Into<String>,
        expected: impl Into<String>,
        found: impl std::fmt::Display,
    ) -> Self {
        CleaningError::TypeMismatch {
            column: column.into(),
            expected: expected.into(),
            found: found.to_string(),
        }
    }

    /// Stable error code for machine-readable reports.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::Parse(_) => "PARSE_ERROR",
            Self::EmptyDataset(_) => "EMPTY_DATASET",
            Self::EmptyColumn(_) => "EMPTY_COLUMN",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::StageFailed { source, .. } => source.error_code(),
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// The stage this error was raised in, if it was attributed to one.
    pub fn failed_stage(&self) -> Option<PipelineStage> {
        match self {
            Self::StageFailed { stage, .. } => Some(*stage),
            Self::WithContext { source, .. } => source.failed_stage(),
            _ => None,
        }
    }
}

impl From<ConfigValidationError> for CleaningError {
    fn from(err: ConfigValidationError) -> Self {
        CleaningError::InvalidConfig(err.to_string())
    }
}

/// Errors are serialized as a struct with `code`, `stage` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 3)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("stage", &self.failed_stage())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CleaningError::EmptyColumn("Quantity".to_string()).error_code(),
            "EMPTY_COLUMN"
        );
        assert_eq!(
            CleaningError::Parse("bad".to_string()).error_code(),
            "PARSE_ERROR"
        );
        assert_eq!(
            CleaningError::type_mismatch("OrderDate", "datetime", "str").error_code(),
            "TYPE_MISMATCH"
        );
    }

    #[test]
    fn test_in_stage_preserves_code_and_names_stage() {
        let error = CleaningError::EmptyColumn("Category".to_string())
            .in_stage(PipelineStage::Imputation);

        assert_eq!(error.error_code(), "EMPTY_COLUMN");
        assert_eq!(error.failed_stage(), Some(PipelineStage::Imputation));
        assert!(error.to_string().contains("Imputing Missing Values"));
        assert!(error.to_string().contains("Category"));
    }

    #[test]
    fn test_in_stage_is_not_nested_twice() {
        let error = CleaningError::Parse("oops".to_string())
            .in_stage(PipelineStage::Loading)
            .in_stage(PipelineStage::Writing);

        assert_eq!(error.failed_stage(), Some(PipelineStage::Loading));
    }

    #[test]
    fn test_error_serialization() {
        let error =
            CleaningError::EmptyColumn("Age".to_string()).in_stage(PipelineStage::Imputation);
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("EMPTY_COLUMN"));
        assert!(json.contains("\"stage\":\"imputation\""));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context() {
        let error = CleaningError::Parse("unterminated quote".to_string())
            .with_context("While loading raw_sales.csv");
        assert!(error.to_string().contains("While loading raw_sales.csv"));
        assert_eq!(error.error_code(), "PARSE_ERROR");
    }

    #[test]
    fn test_config_validation_error_converts() {
        let error: CleaningError = ConfigValidationError::InvalidThreshold(-1.0).into();
        assert_eq!(error.error_code(), "INVALID_CONFIG");
    }
}

//! Custom error types for the heart report pipeline.
//!
//! This module provides the error hierarchy using `thiserror` for the
//! normalization, inference and export stages.
//!
//! Errors are serializable so they can be emitted as JSON when the CLI
//! runs with `--json`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Pipeline stage that rejected a matrix because of its width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scaler,
    Classifier,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Scaler => write!(f, "scaler"),
            Stage::Classifier => write!(f, "classifier"),
        }
    }
}

/// The main error type for the heart report pipeline.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Input is missing a raw field the normalizer requires.
    #[error("Input is missing required field '{field}'")]
    SchemaMismatch { field: String },

    /// Matrix width disagrees with what an artifact was fitted on.
    #[error("{stage} expects {expected} features, got {found}")]
    DimensionMismatch {
        stage: Stage,
        expected: usize,
        found: usize,
    },

    /// A classifier, scaler or feature list could not be loaded.
    #[error("Failed to load {artifact}: {reason}")]
    ArtifactLoadFailure { artifact: String, reason: String },

    /// No valid values found in a numeric column, so no mean can be imputed.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Categorical values produced indicator columns unknown to the model.
    #[error("Unseen categorical values produced columns not in the feature schema: {}", .columns.join(", "))]
    UnseenCategory { columns: Vec<String> },

    /// Manual input outside the form's accepted range.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// PDF or CSV export failed.
    #[error("Failed to export report: {0}")]
    ExportFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ReportError>,
    },
}

impl ReportError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ReportError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for an [`ArtifactLoadFailure`](Self::ArtifactLoadFailure).
    pub fn artifact(artifact: impl Into<String>, reason: impl Into<String>) -> Self {
        ReportError::ArtifactLoadFailure {
            artifact: artifact.into(),
            reason: reason.into(),
        }
    }

    /// Get error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::SchemaMismatch { .. } => "SCHEMA_MISMATCH",
            Self::DimensionMismatch { .. } => "DIMENSION_MISMATCH",
            Self::ArtifactLoadFailure { .. } => "ARTIFACT_LOAD_FAILURE",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::UnseenCategory { .. } => "UNSEEN_CATEGORY",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::ExportFailed(_) => "EXPORT_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error happened before any prediction could be made
    /// because the artifacts themselves are unusable.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::ArtifactLoadFailure { .. } => true,
            Self::WithContext { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for ReportError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ReportError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

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
        self.map_err(|e| ReportError::Polars(e).with_context(context))
    }
}

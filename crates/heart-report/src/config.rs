//! Configuration types for the heart report pipeline.
//!
//! This module provides configuration options using the builder pattern
//! for artifact locations, export targets and encoding behavior.

use crate::normalizer::DEFAULT_SENTINEL;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name of the feature column list inside the artifacts directory.
pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";
/// File name of the scaler inside the artifacts directory.
pub const SCALER_FILE: &str = "scaler.json";
/// File name of the classifier inside the artifacts directory.
pub const MODEL_FILE: &str = "model.json";

/// What to do when a categorical value encodes to a column the model never saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum UnseenCategoryPolicy {
    /// Drop the column silently
    Ignore,
    /// Drop the column and log a warning naming it
    #[default]
    Warn,
    /// Fail the run with `UnseenCategory`
    Reject,
}

/// Configuration for the report pipeline.
///
/// Use [`ReportConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use heart_report::config::{ReportConfig, UnseenCategoryPolicy};
///
/// let config = ReportConfig::builder()
///     .artifacts_dir("models/heart")
///     .unseen_category_policy(UnseenCategoryPolicy::Reject)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory holding `feature_columns.json`, `scaler.json` and `model.json`.
    /// Default: "artifacts"
    pub artifacts_dir: PathBuf,

    /// Override for the feature column list path.
    pub feature_columns_path: Option<PathBuf>,

    /// Override for the scaler path.
    pub scaler_path: Option<PathBuf>,

    /// Override for the classifier path.
    pub model_path: Option<PathBuf>,

    /// Directory where PDF and CSV reports are written.
    /// Default: "outputs"
    pub output_dir: PathBuf,

    /// File name of the single-record PDF report.
    /// Default: "poetic_report.pdf"
    pub pdf_file_name: String,

    /// File name of the batch CSV report.
    /// Default: "heart_poetic_report.csv"
    pub csv_file_name: String,

    /// Value used for missing categorical fields before encoding.
    /// Default: "Unknown"
    pub categorical_sentinel: String,

    /// Handling of indicator columns dropped at reindex time.
    /// Default: Warn
    pub unseen_category_policy: UnseenCategoryPolicy,

    /// Whether to write the PDF/CSV report to disk.
    /// Default: true
    pub write_exports: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            artifacts_dir: PathBuf::from("artifacts"),
            feature_columns_path: None,
            scaler_path: None,
            model_path: None,
            output_dir: PathBuf::from("outputs"),
            pdf_file_name: "poetic_report.pdf".to_string(),
            csv_file_name: "heart_poetic_report.csv".to_string(),
            categorical_sentinel: DEFAULT_SENTINEL.to_string(),
            unseen_category_policy: UnseenCategoryPolicy::default(),
            write_exports: true,
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Resolved path of the feature column list.
    pub fn feature_columns_path(&self) -> PathBuf {
        self.feature_columns_path
            .clone()
            .unwrap_or_else(|| self.artifacts_dir.join(FEATURE_COLUMNS_FILE))
    }

    /// Resolved path of the scaler artifact.
    pub fn scaler_path(&self) -> PathBuf {
        self.scaler_path
            .clone()
            .unwrap_or_else(|| self.artifacts_dir.join(SCALER_FILE))
    }

    /// Resolved path of the classifier artifact.
    pub fn model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| self.artifacts_dir.join(MODEL_FILE))
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.categorical_sentinel.trim().is_empty() {
            return Err(ConfigValidationError::EmptySentinel);
        }

        for (field, value) in [
            ("pdf_file_name", &self.pdf_file_name),
            ("csv_file_name", &self.csv_file_name),
        ] {
            if value.trim().is_empty() || value.contains(['/', '\\']) {
                return Err(ConfigValidationError::InvalidFileName {
                    field: field.to_string(),
                    value: value.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Categorical sentinel must not be empty")]
    EmptySentinel,

    #[error("Invalid file name for '{field}': '{value}' (must be non-empty, without path separators)")]
    InvalidFileName { field: String, value: String },
}

/// Builder for [`ReportConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    artifacts_dir: Option<PathBuf>,
    feature_columns_path: Option<PathBuf>,
    scaler_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    pdf_file_name: Option<String>,
    csv_file_name: Option<String>,
    categorical_sentinel: Option<String>,
    unseen_category_policy: Option<UnseenCategoryPolicy>,
    write_exports: Option<bool>,
}

impl ReportConfigBuilder {
    /// Set the directory holding the three artifacts.
    pub fn artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = Some(dir.into());
        self
    }

    /// Load the feature column list from an explicit path.
    pub fn feature_columns_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.feature_columns_path = Some(path.into());
        self
    }

    /// Load the scaler from an explicit path.
    pub fn scaler_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scaler_path = Some(path.into());
        self
    }

    /// Load the classifier from an explicit path.
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Set the directory for exported reports.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn pdf_file_name(mut self, name: impl Into<String>) -> Self {
        self.pdf_file_name = Some(name.into());
        self
    }

    pub fn csv_file_name(mut self, name: impl Into<String>) -> Self {
        self.csv_file_name = Some(name.into());
        self
    }

    /// Set the value substituted for missing categorical fields.
    pub fn categorical_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.categorical_sentinel = Some(sentinel.into());
        self
    }

    pub fn unseen_category_policy(mut self, policy: UnseenCategoryPolicy) -> Self {
        self.unseen_category_policy = Some(policy);
        self
    }

    /// Enable or disable writing reports to disk.
    ///
    /// When disabled, reports are only returned in memory.
    pub fn write_exports(mut self, enabled: bool) -> Self {
        self.write_exports = Some(enabled);
        self
    }

    /// Build the configuration, validating all values.
    pub fn build(self) -> Result<ReportConfig, ConfigValidationError> {
        let defaults = ReportConfig::default();

        let config = ReportConfig {
            artifacts_dir: self.artifacts_dir.unwrap_or(defaults.artifacts_dir),
            feature_columns_path: self.feature_columns_path,
            scaler_path: self.scaler_path,
            model_path: self.model_path,
            output_dir: self.output_dir.unwrap_or(defaults.output_dir),
            pdf_file_name: self.pdf_file_name.unwrap_or(defaults.pdf_file_name),
            csv_file_name: self.csv_file_name.unwrap_or(defaults.csv_file_name),
            categorical_sentinel: self
                .categorical_sentinel
                .unwrap_or(defaults.categorical_sentinel),
            unseen_category_policy: self
                .unseen_category_policy
                .unwrap_or(defaults.unseen_category_policy),
            write_exports: self.write_exports.unwrap_or(defaults.write_exports),
        };

        config.validate()?;
        Ok(config)
    }
}

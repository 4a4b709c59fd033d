//! Heart Disease Report Library
//!
//! Runs patient records through a pre-fitted heart disease classifier and
//! turns each predicted label into a short, fixed-text report.
//!
//! # Overview
//!
//! The flow is strictly linear:
//!
//! - **Normalization**: mean imputation, boolean coercion and one-hot
//!   expansion, reindexed to the model's feature columns
//! - **Scaling**: the pre-fitted scaler artifact
//! - **Prediction**: the pre-fitted classifier artifact
//! - **Reporting**: fixed texts per label plus a generation timestamp,
//!   exported as a PDF (single record) or a CSV (batch)
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use heart_report::{InferenceContext, ReportConfig, ReportPipeline, load_csv};
//! use chrono::Local;
//!
//! let config = ReportConfig::builder()
//!     .artifacts_dir("artifacts")
//!     .output_dir("outputs")
//!     .build()?;
//! let context = InferenceContext::load(&config)?;
//! let pipeline = ReportPipeline::new(&context, &config);
//!
//! // Batch: one report per row, written to outputs/heart_poetic_report.csv
//! let run = pipeline.run_batch(load_csv("patients.csv")?, Local::now().naive_local())?;
//! println!("{}", run.table);
//! ```
//!
//! # Artifacts
//!
//! Three JSON files are read from the artifacts directory:
//!
//! - `feature_columns.json`: the ordered feature column names
//! - `scaler.json`: a [`Scaler`]
//! - `model.json`: a [`Classifier`]
//!
//! Their widths are checked against each other when the
//! [`InferenceContext`] is built.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod matrix;
pub mod normalizer;
pub mod pipeline;
pub mod record;
pub mod reporting;
pub mod schema;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use artifacts::{Classifier, DecisionTree, InferenceContext, Scaler};
pub use config::{ConfigValidationError, ReportConfig, ReportConfigBuilder, UnseenCategoryPolicy};
pub use error::{ReportError, Result as ReportResult, ResultExt, Stage};
pub use matrix::FeatureMatrix;
pub use normalizer::{EncodingOutcome, Imputer, Normalizer};
pub use pipeline::{BatchRun, Inference, ManualRun, ReportPipeline, load_csv};
pub use record::{ChestPainType, PatientForm, Sex, Thalassemia, records_to_frame};
pub use reporting::{Report, ReportComposer, ReportText, ReportWriter};
pub use schema::{FeatureSchema, FieldKind, RawField, RawSchema};
pub use types::{Prediction, RawRecord, RawValue};
pub use utils::{clean_numeric_string, is_error_marker, parse_numeric_string};

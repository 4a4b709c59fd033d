//! Pre-fitted artifacts and the immutable inference context.
//!
//! The feature column list, scaler and classifier are loaded once and held
//! in an [`InferenceContext`] that is passed explicitly to the pipeline.
//! Loading validates that the three artifacts agree on the feature width,
//! so a context that exists can always encode, scale and predict.
//!
//! # Example
//!
//! ```rust,ignore
//! use heart_report::{InferenceContext, ReportConfig};
//!
//! let config = ReportConfig::builder().artifacts_dir("artifacts").build()?;
//! let context = InferenceContext::load(&config)?;
//! println!("Model expects {} features", context.feature_schema().len());
//! ```

mod classifier;
mod scaler;

pub use classifier::{Classifier, DecisionTree, LEAF};
pub use scaler::Scaler;

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::schema::{FeatureSchema, RawSchema};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::{debug, info};

/// Read-only artifacts shared by every pipeline run in the process.
#[derive(Debug, Clone)]
pub struct InferenceContext {
    raw_schema: RawSchema,
    feature_schema: FeatureSchema,
    scaler: Scaler,
    classifier: Classifier,
}

static_assertions::assert_impl_all!(InferenceContext: Send, Sync);

impl InferenceContext {
    /// Assemble a context from already-loaded parts.
    ///
    /// # Errors
    ///
    /// `ArtifactLoadFailure` if the scaler or classifier is malformed or
    /// their width disagrees with the feature schema.
    pub fn new(
        raw_schema: RawSchema,
        feature_schema: FeatureSchema,
        scaler: Scaler,
        classifier: Classifier,
    ) -> Result<Self> {
        scaler
            .validate()
            .map_err(|reason| ReportError::artifact("scaler", reason))?;
        classifier
            .validate()
            .map_err(|reason| ReportError::artifact("classifier", reason))?;

        if scaler.n_features() != feature_schema.len() {
            return Err(ReportError::artifact(
                "scaler",
                format!(
                    "fitted on {} features but the feature schema has {}",
                    scaler.n_features(),
                    feature_schema.len()
                ),
            ));
        }
        if classifier.n_features() != feature_schema.len() {
            return Err(ReportError::artifact(
                "classifier",
                format!(
                    "fitted on {} features but the feature schema has {}",
                    classifier.n_features(),
                    feature_schema.len()
                ),
            ));
        }

        Ok(Self {
            raw_schema,
            feature_schema,
            scaler,
            classifier,
        })
    }

    /// Load all three artifacts from the paths in `config`.
    pub fn load(config: &ReportConfig) -> Result<Self> {
        Self::load_with_schema(config, RawSchema::heart_disease())
    }

    /// Load artifacts with a custom raw-field schema.
    pub fn load_with_schema(config: &ReportConfig, raw_schema: RawSchema) -> Result<Self> {
        let features_path = config.feature_columns_path();
        let scaler_path = config.scaler_path();
        let model_path = config.model_path();

        info!("Loading artifacts from: {}", config.artifacts_dir.display());

        let feature_schema = FeatureSchema::load(&features_path)?;
        let scaler: Scaler = load_json(&scaler_path)?;
        debug!("Scaler loaded: {} features", scaler.n_features());
        let classifier: Classifier = load_json(&model_path)?;
        debug!("Classifier loaded: {} features", classifier.n_features());

        let context = Self::new(raw_schema, feature_schema, scaler, classifier)?;
        info!(
            "Artifacts loaded successfully: {} feature columns",
            context.feature_schema.len()
        );
        Ok(context)
    }

    pub fn raw_schema(&self) -> &RawSchema {
        &self.raw_schema
    }

    pub fn feature_schema(&self) -> &FeatureSchema {
        &self.feature_schema
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }
}

/// Read and deserialize one JSON artifact, mapping every failure to
/// `ArtifactLoadFailure`.
fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let artifact = path.display().to_string();
    let content = std::fs::read_to_string(path)
        .map_err(|e| ReportError::artifact(&artifact, e.to_string()))?;
    serde_json::from_str(&content).map_err(|e| ReportError::artifact(&artifact, e.to_string()))
}

//! Raw-field and feature schemas.
//!
//! [`RawSchema`] declares up front which input fields exist and how each is
//! encoded, so no dtype sniffing decides a field's role. [`FeatureSchema`]
//! is the ordered column list the pre-fitted scaler and classifier expect.

use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

/// How a raw field is turned into numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    /// Kept as a single f64 column; nulls imputed with the batch mean.
    Numeric,
    /// Expanded into `{field}_{value}` indicator columns.
    Categorical,
    /// Coerced to 0/1.
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawField {
    pub name: String,
    pub kind: FieldKind,
    /// Required fields must be present in every input.
    pub required: bool,
}

impl RawField {
    pub fn required(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: true,
        }
    }

    pub fn optional(name: &str, kind: FieldKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required: false,
        }
    }
}

/// Typed description of the raw input fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSchema {
    fields: Vec<RawField>,
}

impl RawSchema {
    pub fn new(fields: Vec<RawField>) -> Self {
        Self { fields }
    }

    /// The heart disease record layout.
    ///
    /// The nine form fields are required; `fbs`, `exang`, `restecg` and
    /// `slope` appear in the source dataset and are encoded when present.
    pub fn heart_disease() -> Self {
        use FieldKind::*;
        Self::new(vec![
            RawField::required("age", Numeric),
            RawField::required("trestbps", Numeric),
            RawField::required("chol", Numeric),
            RawField::required("thalch", Numeric),
            RawField::required("oldpeak", Numeric),
            RawField::required("ca", Numeric),
            RawField::required("sex", Categorical),
            RawField::required("cp", Categorical),
            RawField::required("thal", Categorical),
            RawField::optional("fbs", Boolean),
            RawField::optional("exang", Boolean),
            RawField::optional("restecg", Categorical),
            RawField::optional("slope", Categorical),
        ])
    }

    pub fn fields(&self) -> &[RawField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&RawField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &RawField> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Return the first required field not in `present`.
    pub fn first_missing<'a, I>(&self, present: I) -> Option<&RawField>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let present: HashSet<&str> = present.into_iter().collect();
        self.required_fields()
            .find(|f| !present.contains(f.name.as_str()))
    }
}

impl Default for RawSchema {
    fn default() -> Self {
        Self::heart_disease()
    }
}

/// Ordered feature column names the scaler and classifier were fitted on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FeatureSchema {
    columns: Vec<String>,
}

impl FeatureSchema {
    /// Build a schema, rejecting empty or duplicated column lists.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        if columns.is_empty() {
            return Err(ReportError::artifact(
                "feature columns",
                "column list is empty",
            ));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(ReportError::artifact(
                    "feature columns",
                    format!("duplicate column '{}'", column),
                ));
            }
        }

        Ok(Self { columns })
    }

    /// Load a JSON array of column names.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let artifact = path.display().to_string();

        let content = std::fs::read_to_string(path)
            .map_err(|e| ReportError::artifact(&artifact, e.to_string()))?;
        let columns: Vec<String> = serde_json::from_str(&content)
            .map_err(|e| ReportError::artifact(&artifact, e.to_string()))?;

        let schema = Self::new(columns).map_err(|e| match e {
            ReportError::ArtifactLoadFailure { reason, .. } => {
                ReportError::artifact(&artifact, reason)
            }
            other => other,
        })?;
        debug!("Loaded {} feature columns from {}", schema.len(), artifact);
        Ok(schema)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_heart_disease_required_fields() {
        let schema = RawSchema::heart_disease();
        let required: Vec<&str> = schema.required_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(
            required,
            vec!["age", "trestbps", "chol", "thalch", "oldpeak", "ca", "sex", "cp", "thal"]
        );
        assert_eq!(schema.field("fbs").unwrap().kind, FieldKind::Boolean);
        assert!(!schema.field("slope").unwrap().required);
    }

    #[test]
    fn test_first_missing() {
        let schema = RawSchema::heart_disease();
        let present = ["age", "trestbps", "thalch", "oldpeak", "ca", "sex", "cp", "thal"];
        assert_eq!(schema.first_missing(present).unwrap().name, "chol");

        let all = [
            "age", "trestbps", "chol", "thalch", "oldpeak", "ca", "sex", "cp", "thal",
        ];
        assert!(schema.first_missing(all).is_none());
    }

    #[test]
    fn test_feature_schema_rejects_duplicates() {
        let result = FeatureSchema::new(vec!["age".to_string(), "age".to_string()]);
        assert!(matches!(
            result,
            Err(ReportError::ArtifactLoadFailure { .. })
        ));
    }

    #[test]
    fn test_feature_schema_rejects_empty() {
        assert!(FeatureSchema::new(vec![]).is_err());
    }

    #[test]
    fn test_feature_schema_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["age", "chol", "sex_Male"]"#).unwrap();

        let schema = FeatureSchema::load(file.path()).unwrap();
        assert_eq!(schema.len(), 3);
        assert!(schema.contains("sex_Male"));
        assert!(!schema.contains("sex_Female"));
    }

    #[test]
    fn test_feature_schema_load_missing_file() {
        let result = FeatureSchema::load("/nonexistent/feature_columns.json");
        let err = result.unwrap_err();
        assert_eq!(err.error_code(), "ARTIFACT_LOAD_FAILURE");
        assert!(err.to_string().contains("feature_columns.json"));
    }

    #[test]
    fn test_feature_schema_load_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"columns": 3}}"#).unwrap();
        assert!(FeatureSchema::load(file.path()).unwrap_err().is_fatal());
    }
}

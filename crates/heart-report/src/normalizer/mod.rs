//! Record normalization.
//!
//! Turns raw records (held in a polars [`DataFrame`]) into a
//! [`FeatureMatrix`] whose columns equal the [`FeatureSchema`] exactly:
//!
//! 1. Check every required raw field is present (`SchemaMismatch` otherwise)
//! 2. Impute: numeric nulls with the batch mean, categorical nulls with a sentinel
//! 3. Coerce boolean fields to 0/1
//! 4. Expand categorical fields into `{field}_{value}` indicator columns
//! 5. Reindex against the feature schema, zero-filling absent columns and
//!    dropping extras
//!
//! Columns not declared in the [`RawSchema`] are never encoded.

mod encoding;
mod imputation;

pub use encoding::indicator_name;
pub use imputation::{Imputer, is_numeric_dtype};

use crate::config::UnseenCategoryPolicy;
use crate::error::{ReportError, Result};
use crate::matrix::FeatureMatrix;
use crate::schema::{FieldKind, FeatureSchema, RawSchema};
use encoding::{ExpandedTable, reindex};
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// Default value for missing categorical fields.
pub const DEFAULT_SENTINEL: &str = "Unknown";

/// Encoded matrix plus what reindexing did to get there.
#[derive(Debug, Clone, Serialize)]
pub struct EncodingOutcome {
    pub matrix: FeatureMatrix,
    /// The input frame with imputed raw fields written back: numeric means,
    /// the categorical sentinel and 0/1 booleans. Other columns are untouched.
    #[serde(skip)]
    pub imputed: DataFrame,
    /// Expanded columns that were not in the feature schema.
    pub dropped_columns: Vec<String>,
    /// Indicator columns (from categorical values) that were dropped.
    pub unseen_indicators: Vec<String>,
    /// Feature schema columns filled with zero for every row.
    pub zero_filled: Vec<String>,
}

/// Converts raw records into a schema-aligned numeric matrix.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer<'a> {
    raw_schema: &'a RawSchema,
    feature_schema: &'a FeatureSchema,
    sentinel: &'a str,
    policy: UnseenCategoryPolicy,
}

impl<'a> Normalizer<'a> {
    pub fn new(raw_schema: &'a RawSchema, feature_schema: &'a FeatureSchema) -> Self {
        Self {
            raw_schema,
            feature_schema,
            sentinel: DEFAULT_SENTINEL,
            policy: UnseenCategoryPolicy::default(),
        }
    }

    /// Set the value substituted for missing categorical fields.
    pub fn with_sentinel(mut self, sentinel: &'a str) -> Self {
        self.sentinel = sentinel;
        self
    }

    pub fn with_policy(mut self, policy: UnseenCategoryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Encode every row of `df`.
    ///
    /// # Errors
    ///
    /// - `SchemaMismatch` if a required raw field has no column
    /// - `NoValidValues` if a numeric column has nulls but no value to average
    /// - `UnseenCategory` under [`UnseenCategoryPolicy::Reject`]
    pub fn encode(&self, df: &DataFrame) -> Result<EncodingOutcome> {
        let present: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        if let Some(field) = self
            .raw_schema
            .first_missing(present.iter().map(String::as_str))
        {
            return Err(ReportError::SchemaMismatch {
                field: field.name.clone(),
            });
        }

        let mut table = ExpandedTable::new(df.height());
        let mut imputed = df.clone();

        for field in self.raw_schema.fields() {
            let Ok(column) = df.column(&field.name) else {
                debug!("Optional field '{}' absent, skipping", field.name);
                continue;
            };
            let series = column.as_materialized_series();

            match field.kind {
                FieldKind::Numeric => {
                    let values = Imputer::numeric_with_mean(series)?;
                    imputed.with_column(Series::new(field.name.as_str().into(), &values))?;
                    table.push_numeric(&field.name, values);
                }
                FieldKind::Boolean => {
                    let values = Imputer::boolean_as_indicator(series)?;
                    let flags: Vec<i32> = values.iter().map(|v| *v as i32).collect();
                    imputed.with_column(Series::new(field.name.as_str().into(), flags))?;
                    table.push_numeric(&field.name, values);
                }
                FieldKind::Categorical => {
                    let values = Imputer::categorical_with_sentinel(series, self.sentinel)?;
                    imputed.with_column(Series::new(
                        field.name.as_str().into(),
                        values.as_slice(),
                    ))?;
                    table.push_indicators(&field.name, &values);
                }
            }
        }

        debug!(
            "Expanded {} raw fields into {} columns",
            self.raw_schema.fields().len(),
            table.column_names().count()
        );

        let reindexed = reindex(table, self.feature_schema)?;

        if !reindexed.unseen_indicators.is_empty() {
            match self.policy {
                UnseenCategoryPolicy::Ignore => {}
                UnseenCategoryPolicy::Warn => warn!(
                    "Dropping indicator columns not in the feature schema: {}",
                    reindexed.unseen_indicators.join(", ")
                ),
                UnseenCategoryPolicy::Reject => {
                    return Err(ReportError::UnseenCategory {
                        columns: reindexed.unseen_indicators,
                    });
                }
            }
        }

        Ok(EncodingOutcome {
            matrix: reindexed.matrix,
            imputed,
            dropped_columns: reindexed.dropped,
            unseen_indicators: reindexed.unseen_indicators,
            zero_filled: reindexed.zero_filled,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn feature_schema() -> FeatureSchema {
        FeatureSchema::new(
            [
                "age",
                "chol",
                "fbs",
                "sex_Female",
                "sex_Male",
                "cp_asymptomatic",
                "cp_typical angina",
                "thal_normal",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
        )
        .unwrap()
    }

    fn small_raw_schema() -> RawSchema {
        use crate::schema::RawField;
        RawSchema::new(vec![
            RawField::required("age", FieldKind::Numeric),
            RawField::required("chol", FieldKind::Numeric),
            RawField::required("sex", FieldKind::Categorical),
            RawField::required("cp", FieldKind::Categorical),
            RawField::required("thal", FieldKind::Categorical),
            RawField::optional("fbs", FieldKind::Boolean),
        ])
    }

    fn batch() -> DataFrame {
        df![
            "age" => [63.0, 41.0, 57.0],
            "chol" => [Some(233.0), None, Some(267.0)],
            "sex" => ["Male", "Female", "Male"],
            "cp" => [Some("typical angina"), Some("asymptomatic"), None],
            "thal" => ["normal", "normal", "reversable defect"],
            "id" => [10i64, 11, 12],
        ]
        .unwrap()
    }

    #[test]
    fn test_columns_equal_schema() {
        let raw = small_raw_schema();
        let features = feature_schema();

        let outcome = Normalizer::new(&raw, &features).encode(&batch()).unwrap();

        assert_eq!(outcome.matrix.columns(), features.columns());
        assert_eq!(outcome.matrix.height(), 3);
    }

    #[test]
    fn test_encoding_is_idempotent() {
        let raw = small_raw_schema();
        let features = feature_schema();
        let normalizer = Normalizer::new(&raw, &features);

        let first = normalizer.encode(&batch()).unwrap();
        let second = normalizer.encode(&batch()).unwrap();
        assert_eq!(first.matrix, second.matrix);
    }

    #[test]
    fn test_row_values() {
        let raw = small_raw_schema();
        let features = feature_schema();

        let outcome = Normalizer::new(&raw, &features).encode(&batch()).unwrap();

        // chol mean of [233, 267] = 250 fills row 1
        assert_eq!(
            outcome.matrix.row(0).unwrap(),
            &[63.0, 233.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0]
        );
        assert_eq!(
            outcome.matrix.row(1).unwrap(),
            &[41.0, 250.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]
        );
        assert_eq!(
            outcome.matrix.row(2).unwrap(),
            &[57.0, 267.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_unseen_and_sentinel_columns_dropped() {
        let raw = small_raw_schema();
        let features = feature_schema();

        let outcome = Normalizer::new(&raw, &features).encode(&batch()).unwrap();

        assert_eq!(
            outcome.unseen_indicators,
            vec!["cp_Unknown", "thal_reversable defect"]
        );
        assert!(!outcome.matrix.columns().iter().any(|c| c == "cp_Unknown"));
        // `id` is not a raw field, so it is never encoded
        assert!(!outcome.dropped_columns.iter().any(|c| c == "id"));
    }

    #[test]
    fn test_absent_optional_field_zero_filled() {
        let raw = small_raw_schema();
        let features = feature_schema();

        let outcome = Normalizer::new(&raw, &features).encode(&batch()).unwrap();

        assert_eq!(outcome.zero_filled, vec!["fbs"]);
        assert_eq!(outcome.matrix.column("fbs").unwrap(), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_imputed_frame_keeps_layout() {
        let raw = small_raw_schema();
        let features = feature_schema();

        let outcome = Normalizer::new(&raw, &features).encode(&batch()).unwrap();
        let imputed = &outcome.imputed;

        assert_eq!(imputed.get_column_names(), batch().get_column_names());
        let chol = imputed.column("chol").unwrap().f64().unwrap();
        assert_eq!(
            chol.into_iter().collect::<Vec<_>>(),
            vec![Some(233.0), Some(250.0), Some(267.0)]
        );
        let cp = imputed.column("cp").unwrap().str().unwrap();
        assert_eq!(
            cp.into_iter().collect::<Vec<_>>(),
            vec![Some("typical angina"), Some("asymptomatic"), Some("Unknown")]
        );
        assert_eq!(imputed.column("id").unwrap().dtype(), &DataType::Int64);
    }

    #[test]
    fn test_boolean_field_encoded() {
        let raw = small_raw_schema();
        let features = feature_schema();
        let mut df = batch();
        df.with_column(Series::new("fbs".into(), &[true, false, true]))
            .unwrap();

        let outcome = Normalizer::new(&raw, &features).encode(&df).unwrap();
        assert_eq!(outcome.matrix.column("fbs").unwrap(), vec![1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_missing_required_field() {
        let raw = small_raw_schema();
        let features = feature_schema();
        let df = batch().drop("chol").unwrap();

        let result = Normalizer::new(&raw, &features).encode(&df);
        assert!(matches!(
            result,
            Err(ReportError::SchemaMismatch { field }) if field == "chol"
        ));
    }

    #[test]
    fn test_reject_policy() {
        let raw = small_raw_schema();
        let features = feature_schema();

        let result = Normalizer::new(&raw, &features)
            .with_policy(UnseenCategoryPolicy::Reject)
            .encode(&batch());
        assert!(matches!(result, Err(ReportError::UnseenCategory { .. })));
    }

    #[test]
    fn test_custom_sentinel() {
        let raw = small_raw_schema();
        let features = feature_schema();

        let outcome = Normalizer::new(&raw, &features)
            .with_sentinel("asymptomatic")
            .encode(&batch())
            .unwrap();

        // The missing chest pain value now lands on a known column
        assert_eq!(
            outcome.matrix.column("cp_asymptomatic").unwrap(),
            vec![0.0, 1.0, 1.0]
        );
    }

    #[test]
    fn test_empty_batch() {
        let raw = small_raw_schema();
        let features = feature_schema();
        let df = batch().head(Some(0));

        let outcome = Normalizer::new(&raw, &features).encode(&df).unwrap();
        assert_eq!(outcome.matrix.height(), 0);
        assert_eq!(outcome.matrix.width(), features.len());
    }
}

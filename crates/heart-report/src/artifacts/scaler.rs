//! Pre-fitted numeric transforms.

use crate::error::{ReportError, Result, Stage};
use crate::matrix::FeatureMatrix;
use serde::{Deserialize, Serialize};

/// A fitted per-column transform, stored as JSON tagged by `kind`.
///
/// ```json
/// { "kind": "standard", "mean": [54.0, 132.0], "scale": [9.0, 17.5] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { min: Vec<f64>, scale: Vec<f64> },
}

impl Scaler {
    /// Number of features the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        match self {
            Scaler::Standard { mean, .. } => mean.len(),
            Scaler::MinMax { min, .. } => min.len(),
        }
    }

    /// Check parameter vectors agree in length and are finite.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let (offsets, scale) = match self {
            Scaler::Standard { mean, scale } => (mean, scale),
            Scaler::MinMax { min, scale } => (min, scale),
        };

        if offsets.is_empty() {
            return Err("scaler has no features".to_string());
        }
        if offsets.len() != scale.len() {
            return Err(format!(
                "parameter lengths differ ({} vs {})",
                offsets.len(),
                scale.len()
            ));
        }
        if offsets.iter().chain(scale).any(|v| !v.is_finite()) {
            return Err("parameters must be finite".to_string());
        }
        Ok(())
    }

    /// Transform every row, keeping the shape.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the matrix width differs from [`n_features`](Self::n_features).
    pub fn transform(&self, matrix: &FeatureMatrix) -> Result<FeatureMatrix> {
        let expected = self.n_features();
        if matrix.width() != expected {
            return Err(ReportError::DimensionMismatch {
                stage: Stage::Scaler,
                expected,
                found: matrix.width(),
            });
        }

        let scaled = match self {
            Scaler::Standard { mean, scale } => matrix.map_rows(|row| {
                row.iter()
                    .zip(mean.iter().zip(scale))
                    .map(|(x, (m, s))| {
                        // zero variance columns are only centered
                        let s = if *s == 0.0 { 1.0 } else { *s };
                        (x - m) / s
                    })
                    .collect()
            }),
            Scaler::MinMax { min, scale } => matrix.map_rows(|row| {
                row.iter()
                    .zip(min.iter().zip(scale))
                    .map(|(x, (m, s))| x * s + m)
                    .collect()
            }),
        };
        Ok(scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: Vec<Vec<f64>>) -> FeatureMatrix {
        let width = rows.first().map_or(0, Vec::len);
        let columns = (0..width).map(|i| format!("f{}", i)).collect();
        FeatureMatrix::from_rows(columns, rows).unwrap()
    }

    #[test]
    fn test_standard_transform() {
        let scaler = Scaler::Standard {
            mean: vec![10.0, 0.0],
            scale: vec![2.0, 0.5],
        };

        let out = scaler
            .transform(&matrix(vec![vec![14.0, 1.0], vec![10.0, -1.0]]))
            .unwrap();

        assert_eq!(out.row(0).unwrap(), &[2.0, 2.0]);
        assert_eq!(out.row(1).unwrap(), &[0.0, -2.0]);
    }

    #[test]
    fn test_standard_zero_scale_only_centers() {
        let scaler = Scaler::Standard {
            mean: vec![3.0],
            scale: vec![0.0],
        };
        let out = scaler.transform(&matrix(vec![vec![5.0]])).unwrap();
        assert_eq!(out.row(0).unwrap(), &[2.0]);
    }

    #[test]
    fn test_min_max_transform() {
        let scaler = Scaler::MinMax {
            min: vec![-1.0],
            scale: vec![0.5],
        };
        let out = scaler.transform(&matrix(vec![vec![4.0]])).unwrap();
        assert_eq!(out.row(0).unwrap(), &[1.0]);
    }

    #[test]
    fn test_dimension_mismatch_extra_column() {
        let scaler = Scaler::Standard {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        };
        let result = scaler.transform(&matrix(vec![vec![1.0, 2.0, 3.0]]));
        assert!(matches!(
            result,
            Err(ReportError::DimensionMismatch {
                stage: Stage::Scaler,
                expected: 2,
                found: 3
            })
        ));
    }

    #[test]
    fn test_dimension_mismatch_missing_column() {
        let scaler = Scaler::Standard {
            mean: vec![0.0, 0.0],
            scale: vec![1.0, 1.0],
        };
        let result = scaler.transform(&matrix(vec![vec![1.0]]));
        assert!(matches!(result, Err(ReportError::DimensionMismatch { .. })));
    }

    #[test]
    fn test_deserialize_tagged() {
        let scaler: Scaler =
            serde_json::from_str(r#"{"kind": "standard", "mean": [1.0], "scale": [2.0]}"#)
                .unwrap();
        assert_eq!(scaler.n_features(), 1);

        let scaler: Scaler =
            serde_json::from_str(r#"{"kind": "min_max", "min": [0.0, 0.0], "scale": [1.0, 1.0]}"#)
                .unwrap();
        assert_eq!(scaler.n_features(), 2);
    }

    #[test]
    fn test_validate() {
        let bad = Scaler::Standard {
            mean: vec![0.0, 1.0],
            scale: vec![1.0],
        };
        assert!(bad.validate().is_err());

        let non_finite = Scaler::MinMax {
            min: vec![f64::NAN],
            scale: vec![1.0],
        };
        assert!(non_finite.validate().is_err());
    }
}

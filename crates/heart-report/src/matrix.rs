//! Dense row-major numeric matrix with named columns.

use crate::error::{ReportError, Result};
use serde::Serialize;

/// Numeric table handed from the normalizer to the scaler and classifier.
///
/// Every row has exactly `columns.len()` values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    /// Build a matrix, checking that every row matches the column count.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self> {
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(ReportError::InvalidInput(format!(
                "row {} has {} values but the matrix has {} columns",
                i,
                row.len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&[f64]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Values of one named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// Apply `f` to every row, keeping the column names.
    pub(crate) fn map_rows<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&[f64]) -> Vec<f64>,
    {
        Self {
            columns: self.columns.clone(),
            rows: self.rows.iter().map(|row| f(row)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_from_rows_checks_width() {
        let result = FeatureMatrix::from_rows(names(&["a", "b"]), vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_accessors() {
        let matrix = FeatureMatrix::from_rows(
            names(&["a", "b"]),
            vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]],
        )
        .unwrap();

        assert_eq!(matrix.height(), 3);
        assert_eq!(matrix.width(), 2);
        assert_eq!(matrix.row(1).unwrap(), &[2.0, 5.0]);
        assert_eq!(matrix.column("b").unwrap(), vec![4.0, 5.0, 6.0]);
        assert!(matrix.column("c").is_none());
    }

    #[test]
    fn test_empty_matrix() {
        let matrix = FeatureMatrix::from_rows(names(&["a"]), vec![]).unwrap();
        assert_eq!(matrix.height(), 0);
        assert_eq!(matrix.width(), 1);
    }

    #[test]
    fn test_map_rows() {
        let matrix =
            FeatureMatrix::from_rows(names(&["a", "b"]), vec![vec![1.0, 2.0]]).unwrap();
        let doubled = matrix.map_rows(|row| row.iter().map(|v| v * 2.0).collect());
        assert_eq!(doubled.row(0).unwrap(), &[2.0, 4.0]);
        assert_eq!(doubled.columns(), matrix.columns());
    }
}

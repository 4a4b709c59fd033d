//! Per-kind value extraction and imputation.
//!
//! Numeric fields are filled with the batch mean, categorical fields with a
//! sentinel, and boolean fields are coerced to 0/1.

use crate::error::{ReportError, Result};
use crate::utils::{parse_boolean_string, parse_numeric_string};
use polars::prelude::*;
use tracing::debug;

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Imputation helpers for the three field kinds.
pub struct Imputer;

impl Imputer {
    /// Read a column as f64, treating unparsable strings and non-finite values as null.
    pub fn numeric_values(series: &Series) -> Result<Vec<Option<f64>>> {
        let dtype = series.dtype();

        if is_numeric_dtype(dtype) {
            let cast = series.cast(&DataType::Float64)?;
            return Ok(cast
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()))
                .collect());
        }

        match dtype {
            DataType::String => Ok(series
                .str()?
                .into_iter()
                .map(|v| v.and_then(parse_numeric_string))
                .collect()),
            DataType::Boolean => Ok(series
                .bool()?
                .into_iter()
                .map(|v| v.map(|b| if b { 1.0 } else { 0.0 }))
                .collect()),
            DataType::Null => Ok(vec![None; series.len()]),
            other => Err(ReportError::InvalidInput(format!(
                "column '{}' has type {} and cannot be read as numeric",
                series.name(),
                other
            ))),
        }
    }

    /// Fill nulls in a numeric column with the mean of its valid values.
    ///
    /// Fails with `NoValidValues` only when there is something to fill but
    /// nothing to average.
    pub fn numeric_with_mean(series: &Series) -> Result<Vec<f64>> {
        let values = Self::numeric_values(series)?;
        let missing = values.iter().filter(|v| v.is_none()).count();

        if missing == 0 {
            return Ok(values.into_iter().flatten().collect());
        }

        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return Err(ReportError::NoValidValues(series.name().to_string()));
        }
        let mean = present.iter().sum::<f64>() / present.len() as f64;

        debug!(
            "Filled {} missing values in '{}' with mean: {:.2}",
            missing,
            series.name(),
            mean
        );
        Ok(values.into_iter().map(|v| v.unwrap_or(mean)).collect())
    }

    /// Read a categorical column as strings, filling nulls with `sentinel`.
    pub fn categorical_with_sentinel(series: &Series, sentinel: &str) -> Result<Vec<String>> {
        let as_string = if matches!(series.dtype(), DataType::String) {
            series.clone()
        } else {
            series.cast(&DataType::String)?
        };

        let mut filled = 0usize;
        let values = as_string
            .str()?
            .into_iter()
            .map(|v| match v {
                Some(s) => s.to_string(),
                None => {
                    filled += 1;
                    sentinel.to_string()
                }
            })
            .collect();

        if filled > 0 {
            debug!(
                "Filled {} missing values in '{}' with constant value: '{}'",
                filled,
                series.name(),
                sentinel
            );
        }
        Ok(values)
    }

    /// Coerce a boolean-like column to 0/1. Nulls and unrecognized values become 0.
    pub fn boolean_as_indicator(series: &Series) -> Result<Vec<f64>> {
        let dtype = series.dtype();
        let to_indicator = |b: Option<bool>| if b.unwrap_or(false) { 1.0 } else { 0.0 };

        if is_numeric_dtype(dtype) {
            return Ok(Self::numeric_values(series)?
                .into_iter()
                .map(|v| to_indicator(v.map(|x| x != 0.0)))
                .collect());
        }

        match dtype {
            DataType::Boolean => Ok(series.bool()?.into_iter().map(to_indicator).collect()),
            DataType::String => Ok(series
                .str()?
                .into_iter()
                .map(|v| to_indicator(v.and_then(parse_boolean_string)))
                .collect()),
            DataType::Null => Ok(vec![0.0; series.len()]),
            other => Err(ReportError::InvalidInput(format!(
                "column '{}' has type {} and cannot be read as boolean",
                series.name(),
                other
            ))),
        }
    }
}

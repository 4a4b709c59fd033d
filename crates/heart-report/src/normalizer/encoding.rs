//! Indicator expansion and schema alignment.

use crate::error::Result;
use crate::matrix::FeatureMatrix;
use crate::schema::FeatureSchema;
use std::collections::{BTreeSet, HashMap};

/// Named numeric columns produced before reindexing, in production order.
#[derive(Debug, Default)]
pub(crate) struct ExpandedTable {
    height: usize,
    columns: Vec<(String, Vec<f64>)>,
    indicators: BTreeSet<String>,
}

impl ExpandedTable {
    pub(crate) fn new(height: usize) -> Self {
        Self {
            height,
            ..Self::default()
        }
    }

    pub(crate) fn push_numeric(&mut self, name: &str, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.height);
        self.columns.push((name.to_string(), values));
    }

    /// Expand one categorical field into `{field}_{value}` columns, one per
    /// distinct value, in sorted value order.
    pub(crate) fn push_indicators(&mut self, field: &str, values: &[String]) {
        debug_assert_eq!(values.len(), self.height);
        let distinct: BTreeSet<&str> = values.iter().map(String::as_str).collect();

        for category in distinct {
            let name = indicator_name(field, category);
            let column = values
                .iter()
                .map(|v| if v == category { 1.0 } else { 0.0 })
                .collect();
            self.indicators.insert(name.clone());
            self.columns.push((name, column));
        }
    }

    pub(crate) fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(n, _)| n.as_str())
    }
}

/// Column name for one categorical value.
pub fn indicator_name(field: &str, value: &str) -> String {
    format!("{}_{}", field, value)
}

/// Result of aligning an expanded table to the feature schema.
#[derive(Debug)]
pub(crate) struct Reindexed {
    pub matrix: FeatureMatrix,
    /// Expanded columns absent from the schema.
    pub dropped: Vec<String>,
    /// The subset of `dropped` that came from categorical expansion.
    pub unseen_indicators: Vec<String>,
    /// Schema columns the expansion never produced.
    pub zero_filled: Vec<String>,
}

/// Align `table` to `schema`: add missing columns as zeros, drop extras,
/// keep row order.
pub(crate) fn reindex(table: ExpandedTable, schema: &FeatureSchema) -> Result<Reindexed> {
    let height = table.height;
    let mut by_name: HashMap<String, Vec<f64>> = HashMap::with_capacity(table.columns.len());
    let mut dropped = Vec::new();
    let mut unseen_indicators = Vec::new();

    for (name, values) in table.columns {
        if schema.contains(&name) {
            by_name.insert(name, values);
        } else {
            if table.indicators.contains(&name) {
                unseen_indicators.push(name.clone());
            }
            dropped.push(name);
        }
    }

    let mut zero_filled = Vec::new();
    let mut rows = vec![Vec::with_capacity(schema.len()); height];

    for column in schema.columns() {
        match by_name.get(column) {
            Some(values) => {
                for (row, value) in rows.iter_mut().zip(values) {
                    row.push(*value);
                }
            }
            None => {
                zero_filled.push(column.clone());
                for row in rows.iter_mut() {
                    row.push(0.0);
                }
            }
        }
    }

    let matrix = FeatureMatrix::from_rows(schema.columns().to_vec(), rows)?;

    Ok(Reindexed {
        matrix,
        dropped,
        unseen_indicators,
        zero_filled,
    })
}

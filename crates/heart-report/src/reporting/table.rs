//! Tabular views of composed reports.

use super::composer::Report;
use crate::error::{ReportError, Result};
use polars::prelude::*;

/// Columns appended to every exported table, in order.
pub const REPORT_COLUMNS: [&str; 5] = [
    "Heart_Disease_Prediction",
    "Poetic_Summary",
    "Doctor_Note",
    "Companion_Message",
    "Report_Generated_At",
];

/// A frame with the five report columns, one row per report.
pub fn report_frame(reports: &[Report]) -> Result<DataFrame> {
    Ok(DataFrame::new(report_columns(reports))?)
}

/// `df` with the five report columns appended.
///
/// Existing columns with a report column's name are replaced.
pub fn append_report_columns(df: &DataFrame, reports: &[Report]) -> Result<DataFrame> {
    if df.height() != reports.len() {
        return Err(ReportError::InvalidInput(format!(
            "{} reports for {} rows",
            reports.len(),
            df.height()
        )));
    }

    let mut out = df.clone();
    for column in report_columns(reports) {
        out.with_column(column)?;
    }
    Ok(out)
}

fn report_columns(reports: &[Report]) -> Vec<Column> {
    let labels: Vec<i32> = reports.iter().map(|r| i32::from(r.prediction.as_u8())).collect();
    let text = |pick: fn(&Report) -> &str| -> Vec<String> {
        reports.iter().map(|r| pick(r).to_string()).collect()
    };

    vec![
        Column::new(REPORT_COLUMNS[0].into(), labels),
        Column::new(REPORT_COLUMNS[1].into(), text(|r| r.poetic_summary)),
        Column::new(REPORT_COLUMNS[2].into(), text(|r| r.doctor_note)),
        Column::new(REPORT_COLUMNS[3].into(), text(|r| r.companion_message)),
        Column::new(REPORT_COLUMNS[4].into(), text(|r| r.generated_at.as_str())),
    ]
}

/// Every row of `df` as (column, value) pairs. Nulls become empty strings.
pub fn row_fields(df: &DataFrame) -> Result<Vec<Vec<(String, String)>>> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let mut fields = Vec::with_capacity(names.len());
        for (name, column) in names.iter().zip(df.get_columns()) {
            fields.push((name.clone(), display_value(&column.get(idx)?)));
        }
        rows.push(fields);
    }
    Ok(rows)
}

fn display_value(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

//! Manual patient input and conversion of records to a polars frame.

use crate::error::{ReportError, Result};
use crate::schema::{FieldKind, RawSchema};
use crate::types::{RawRecord, RawValue};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ReportError;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| {
                        let allowed: Vec<&str> = Self::ALL.iter().map(|v| v.as_str()).collect();
                        ReportError::InvalidInput(format!(
                            "'{}' is not one of: {}",
                            s,
                            allowed.join(", ")
                        ))
                    })
            }
        }
    };
}

string_enum!(
    /// Patient sex as offered by the form.
    Sex {
        Male => "Male",
        Female => "Female",
    }
);

string_enum!(
    /// Chest pain type (`cp`).
    ChestPainType {
        TypicalAngina => "typical angina",
        AtypicalAngina => "atypical angina",
        NonAnginal => "non-anginal",
        Asymptomatic => "asymptomatic",
    }
);

string_enum!(
    /// Thalassemia result (`thal`).
    Thalassemia {
        Normal => "normal",
        FixedDefect => "fixed defect",
        ReversableDefect => "reversable defect",
    }
);

/// A manually entered patient record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientForm {
    pub age: u32,
    /// Resting blood pressure.
    pub trestbps: f64,
    pub chol: f64,
    /// Maximum heart rate achieved.
    pub thalch: f64,
    /// ST depression.
    pub oldpeak: f64,
    /// Number of major vessels.
    pub ca: u32,
    pub sex: Sex,
    pub cp: ChestPainType,
    pub thal: Thalassemia,
}

impl PatientForm {
    pub const AGE_RANGE: std::ops::RangeInclusive<u32> = 1..=120;
    pub const VESSELS_RANGE: std::ops::RangeInclusive<u32> = 0..=3;

    /// Check the form's input bounds.
    ///
    /// These are the bounds of the entry widgets, not clinical plausibility checks.
    pub fn validate(&self) -> Result<()> {
        if !Self::AGE_RANGE.contains(&self.age) {
            return Err(ReportError::InvalidInput(format!(
                "age {} outside [1, 120]",
                self.age
            )));
        }
        if !Self::VESSELS_RANGE.contains(&self.ca) {
            return Err(ReportError::InvalidInput(format!(
                "major vessels {} outside [0, 3]",
                self.ca
            )));
        }
        for (name, value) in [
            ("trestbps", self.trestbps),
            ("chol", self.chol),
            ("thalch", self.thalch),
            ("oldpeak", self.oldpeak),
        ] {
            if !value.is_finite() {
                return Err(ReportError::InvalidInput(format!(
                    "{} must be a finite number",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Convert to a raw record keyed by dataset field names.
    pub fn to_record(&self) -> RawRecord {
        RawRecord::new()
            .with("age", RawValue::Number(f64::from(self.age)))
            .with("trestbps", RawValue::Number(self.trestbps))
            .with("chol", RawValue::Number(self.chol))
            .with("thalch", RawValue::Number(self.thalch))
            .with("oldpeak", RawValue::Number(self.oldpeak))
            .with("ca", RawValue::Number(f64::from(self.ca)))
            .with("sex", RawValue::Text(self.sex.to_string()))
            .with("cp", RawValue::Text(self.cp.to_string()))
            .with("thal", RawValue::Text(self.thal.to_string()))
    }

    /// Labeled fields in the order they appear on the printed report.
    pub fn labeled_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Age", self.age.to_string()),
            ("Blood Pressure", self.trestbps.to_string()),
            ("Cholesterol", self.chol.to_string()),
            ("Max Heart Rate", self.thalch.to_string()),
            ("ST Depression", self.oldpeak.to_string()),
            ("Major Vessels", self.ca.to_string()),
            ("Sex", self.sex.to_string()),
            ("Chest Pain Type", self.cp.to_string()),
            ("Thalassemia", self.thal.to_string()),
        ]
    }
}

/// Build a frame with one row per record.
///
/// Column order follows first appearance across records. Column types come
/// from `schema`; fields it does not declare become string columns. A
/// record lacking a field gets a null in that column. No records gives an
/// empty frame with the schema's required columns.
pub fn records_to_frame(records: &[RawRecord], schema: &RawSchema) -> Result<DataFrame> {
    let mut names: Vec<&str> = Vec::new();
    if records.is_empty() {
        names.extend(schema.required_fields().map(|f| f.name.as_str()));
    }
    for record in records {
        for (name, _) in record.iter() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }

    let mut columns = Vec::with_capacity(names.len());
    for name in names {
        let values = records
            .iter()
            .map(|r| r.get(name).unwrap_or(&RawValue::Missing));
        let kind = schema.field(name).map(|f| f.kind);

        let series = match kind {
            Some(FieldKind::Numeric) => {
                let data: Vec<Option<f64>> = values.map(raw_as_f64).collect();
                Series::new(name.into(), data)
            }
            Some(FieldKind::Boolean) => {
                let data: Vec<Option<bool>> = values.map(raw_as_bool).collect();
                Series::new(name.into(), data)
            }
            Some(FieldKind::Categorical) | None => {
                let data: Vec<Option<String>> = values
                    .map(|v| match v {
                        RawValue::Missing => None,
                        other => Some(other.to_string()),
                    })
                    .collect();
                Series::new(name.into(), data)
            }
        };
        columns.push(Column::from(series));
    }

    Ok(DataFrame::new(columns)?)
}

fn raw_as_f64(value: &RawValue) -> Option<f64> {
    match value {
        RawValue::Number(v) => Some(*v).filter(|v| v.is_finite()),
        RawValue::Flag(b) => Some(if *b { 1.0 } else { 0.0 }),
        RawValue::Text(s) => crate::utils::parse_numeric_string(s),
        RawValue::Missing => None,
    }
}

fn raw_as_bool(value: &RawValue) -> Option<bool> {
    match value {
        RawValue::Flag(b) => Some(*b),
        RawValue::Number(v) => Some(*v != 0.0),
        RawValue::Text(s) => crate::utils::parse_boolean_string(s),
        RawValue::Missing => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_form() -> PatientForm {
        PatientForm {
            age: 63,
            trestbps: 145.0,
            chol: 233.0,
            thalch: 150.0,
            oldpeak: 2.3,
            ca: 0,
            sex: Sex::Male,
            cp: ChestPainType::TypicalAngina,
            thal: Thalassemia::Normal,
        }
    }

    #[test]
    fn test_enum_round_trip_text() {
        assert_eq!("non-anginal".parse::<ChestPainType>().unwrap(), ChestPainType::NonAnginal);
        assert_eq!("Female".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!(
            "Reversable Defect".parse::<Thalassemia>().unwrap(),
            Thalassemia::ReversableDefect
        );
        assert!("angina".parse::<ChestPainType>().is_err());
    }

    #[test]
    fn test_enum_serde_uses_text() {
        let json = serde_json::to_string(&ChestPainType::AtypicalAngina).unwrap();
        assert_eq!(json, "\"atypical angina\"");
    }

    #[test]
    fn test_validate_ranges() {
        assert!(example_form().validate().is_ok());

        let too_old = PatientForm {
            age: 121,
            ..example_form()
        };
        assert!(too_old.validate().is_err());

        let newborn = PatientForm {
            age: 0,
            ..example_form()
        };
        assert!(newborn.validate().is_err());

        let vessels = PatientForm {
            ca: 4,
            ..example_form()
        };
        assert!(vessels.validate().is_err());

        let nan = PatientForm {
            chol: f64::NAN,
            ..example_form()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_to_record() {
        let record = example_form().to_record();
        assert_eq!(record.len(), 9);
        assert_eq!(record.get("oldpeak"), Some(&RawValue::Number(2.3)));
        assert_eq!(
            record.get("cp"),
            Some(&RawValue::Text("typical angina".to_string()))
        );
    }

    #[test]
    fn test_labeled_fields_order() {
        let labels: Vec<&str> = example_form()
            .labeled_fields()
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(labels.first(), Some(&"Age"));
        assert_eq!(labels.last(), Some(&"Thalassemia"));
        assert_eq!(labels.len(), 9);
    }

    #[test]
    fn test_records_to_frame() {
        let schema = RawSchema::heart_disease();
        let records = vec![
            example_form().to_record(),
            RawRecord::new()
                .with("age", RawValue::Number(41.0))
                .with("fbs", RawValue::Flag(true)),
        ];

        let df = records_to_frame(&records, &schema).unwrap();

        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 10);
        assert_eq!(df.column("age").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("sex").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("fbs").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column("chol").unwrap().null_count(), 1);
    }

    #[test]
    fn test_no_records_gives_required_columns() {
        let schema = RawSchema::heart_disease();

        let df = records_to_frame(&[], &schema).unwrap();

        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), 9);
        assert_eq!(df.get_column_names()[0].as_str(), "age");
        assert_eq!(df.column("ca").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("thal").unwrap().dtype(), &DataType::String);
    }
}

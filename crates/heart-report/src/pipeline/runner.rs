//! Manual and batch report runs.

use crate::artifacts::InferenceContext;
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::normalizer::{EncodingOutcome, Normalizer};
use crate::record::{PatientForm, records_to_frame};
use crate::reporting::{
    Report, ReportComposer, ReportWriter, append_report_columns, report_frame, row_fields,
};
use crate::types::{Prediction, RawRecord};
use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info};

/// Labels for a frame plus the encoding that produced them.
#[derive(Debug, Clone, Serialize)]
pub struct Inference {
    pub encoding: EncodingOutcome,
    pub labels: Vec<Prediction>,
}

/// Result of a single manual submission.
#[derive(Debug, Clone)]
pub struct ManualRun {
    pub report: Report,
    /// One row with the five report columns.
    pub table: DataFrame,
    pub encoding: EncodingOutcome,
    /// Where the PDF was written, if exports are enabled.
    pub pdf_path: Option<PathBuf>,
}

/// Result of a batch run.
#[derive(Debug, Clone)]
pub struct BatchRun {
    /// One report per input row, in input order.
    pub reports: Vec<Report>,
    /// The imputed input columns followed by the five report columns.
    pub table: DataFrame,
    pub encoding: EncodingOutcome,
    /// Where the CSV was written, if exports are enabled.
    pub csv_path: Option<PathBuf>,
}

/// Runs records through normalizer, scaler, classifier and composer.
///
/// The pipeline borrows a loaded [`InferenceContext`]; one context can
/// serve any number of runs.
///
/// # Example
///
/// ```rust,ignore
/// use heart_report::{InferenceContext, ReportConfig, ReportPipeline};
///
/// let config = ReportConfig::default();
/// let context = InferenceContext::load(&config)?;
/// let run = ReportPipeline::new(&context, &config).run_manual(&form, now)?;
/// println!("{}", run.report.prediction_text);
/// ```
#[derive(Debug, Clone)]
pub struct ReportPipeline<'a> {
    context: &'a InferenceContext,
    config: &'a ReportConfig,
    writer: ReportWriter,
}

static_assertions::assert_impl_all!(ReportPipeline<'static>: Send, Sync);

impl<'a> ReportPipeline<'a> {
    pub fn new(context: &'a InferenceContext, config: &'a ReportConfig) -> Self {
        Self {
            context,
            config,
            writer: ReportWriter::new(config.output_dir.clone()),
        }
    }

    /// Encode, scale and classify every row of `df`.
    ///
    /// Any failure aborts the whole frame; no partial labels are returned.
    pub fn infer(&self, df: &DataFrame) -> Result<Inference> {
        info!("Step 1: Encoding {} record(s)...", df.height());
        let encoding = Normalizer::new(self.context.raw_schema(), self.context.feature_schema())
            .with_sentinel(&self.config.categorical_sentinel)
            .with_policy(self.config.unseen_category_policy)
            .encode(df)?;
        debug!(
            "Encoded matrix: {} x {} ({} zero-filled, {} dropped)",
            encoding.matrix.height(),
            encoding.matrix.width(),
            encoding.zero_filled.len(),
            encoding.dropped_columns.len()
        );

        info!("Step 2: Scaling features...");
        let scaled = self.context.scaler().transform(&encoding.matrix)?;

        info!("Step 3: Predicting...");
        let labels = self.context.classifier().predict(&scaled)?;
        let positives = labels.iter().filter(|l| l.is_disease()).count();
        info!("Predicted {} of {} record(s) at risk", positives, labels.len());

        Ok(Inference { encoding, labels })
    }

    /// Produce the report for one manually entered record.
    ///
    /// Writes the PDF when exports are enabled.
    pub fn run_manual(&self, form: &PatientForm, now: NaiveDateTime) -> Result<ManualRun> {
        let start_time = Instant::now();
        form.validate()?;

        let df = records_to_frame(&[form.to_record()], self.context.raw_schema())?;
        let inference = self.infer(&df).inspect_err(|e| error!("Manual run failed: {}", e))?;

        info!("Step 4: Composing report...");
        let fields = form
            .labeled_fields()
            .into_iter()
            .map(|(label, value)| (label.to_string(), value))
            .collect();
        let label = inference.labels.first().copied().ok_or_else(|| {
            ReportError::InvalidInput("classifier returned no label".to_string())
        })?;
        let report = ReportComposer::compose(fields, label, &now);
        let table = report_frame(std::slice::from_ref(&report))?;

        let pdf_path = if self.config.write_exports {
            info!("Step 5: Exporting PDF...");
            Some(self.writer.write_pdf(&report, &self.config.pdf_file_name)?)
        } else {
            None
        };

        info!("Manual report completed in {:?}", start_time.elapsed());
        Ok(ManualRun {
            report,
            table,
            encoding: inference.encoding,
            pdf_path,
        })
    }

    /// Produce one report per row of `df`, all sharing one timestamp.
    ///
    /// Writes the CSV when exports are enabled.
    pub fn run_batch(&self, df: DataFrame, now: NaiveDateTime) -> Result<BatchRun> {
        let start_time = Instant::now();
        info!("Starting batch run: {:?}", df.shape());

        let inference = self.infer(&df).inspect_err(|e| error!("Batch run failed: {}", e))?;

        info!("Step 4: Composing {} report(s)...", inference.labels.len());
        let imputed = &inference.encoding.imputed;
        let reports =
            ReportComposer::compose_batch(row_fields(imputed)?, &inference.labels, &now);
        let mut table = append_report_columns(imputed, &reports)?;

        let csv_path = if self.config.write_exports {
            info!("Step 5: Exporting CSV...");
            Some(self.writer.write_csv(&mut table, &self.config.csv_file_name)?)
        } else {
            None
        };

        info!("Batch completed in {:?}", start_time.elapsed());
        Ok(BatchRun {
            reports,
            table,
            encoding: inference.encoding,
            csv_path,
        })
    }

    /// Batch run over in-memory records.
    pub fn run_records(&self, records: &[RawRecord], now: NaiveDateTime) -> Result<BatchRun> {
        let df = records_to_frame(records, self.context.raw_schema())?;
        self.run_batch(df, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::Scaler;
    use crate::artifacts::{Classifier, DecisionTree, LEAF};
    use crate::record::{ChestPainType, Sex, Thalassemia};
    use crate::schema::{FeatureSchema, RawSchema};
    use crate::types::RawValue;
    use chrono::NaiveDate;

    const FEATURES: [&str; 17] = [
        "age",
        "trestbps",
        "chol",
        "thalch",
        "oldpeak",
        "ca",
        "fbs",
        "exang",
        "sex_Female",
        "sex_Male",
        "cp_asymptomatic",
        "cp_atypical angina",
        "cp_non-anginal",
        "cp_typical angina",
        "thal_fixed defect",
        "thal_normal",
        "thal_reversable defect",
    ];

    /// Identity scaling and a single stump on raw `oldpeak`.
    fn context() -> InferenceContext {
        let n = FEATURES.len();
        InferenceContext::new(
            RawSchema::heart_disease(),
            FeatureSchema::new(FEATURES.iter().map(|f| f.to_string()).collect()).unwrap(),
            Scaler::Standard {
                mean: vec![0.0; n],
                scale: vec![1.0; n],
            },
            Classifier::RandomForest {
                n_features: n,
                classes: vec![0, 1],
                trees: vec![DecisionTree {
                    children_left: vec![1, LEAF, LEAF],
                    children_right: vec![2, LEAF, LEAF],
                    feature: vec![4, -2, -2],
                    threshold: vec![2.0, -2.0, -2.0],
                    value: vec![vec![5.0, 5.0], vec![9.0, 1.0], vec![1.0, 9.0]],
                }],
            },
        )
        .unwrap()
    }

    fn config() -> ReportConfig {
        ReportConfig::builder().write_exports(false).build().unwrap()
    }

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn form(oldpeak: f64) -> PatientForm {
        PatientForm {
            age: 63,
            trestbps: 145.0,
            chol: 233.0,
            thalch: 150.0,
            oldpeak,
            ca: 0,
            sex: Sex::Male,
            cp: ChestPainType::TypicalAngina,
            thal: Thalassemia::Normal,
        }
    }

    #[test]
    fn test_manual_run_labels() {
        let context = context();
        let config = config();
        let pipeline = ReportPipeline::new(&context, &config);

        let calm = pipeline.run_manual(&form(1.0), now()).unwrap();
        let risk = pipeline.run_manual(&form(3.0), now()).unwrap();

        assert_eq!(calm.report.prediction, Prediction::NoDisease);
        assert_eq!(risk.report.prediction, Prediction::Disease);
        assert_eq!(risk.report.generated_at, "2026-10-18 09:30:00");
        assert_eq!(risk.table.shape(), (1, 5));
        assert!(risk.pdf_path.is_none());
    }

    #[test]
    fn test_manual_run_zero_fills_absent_flags() {
        let context = context();
        let config = config();

        let run = ReportPipeline::new(&context, &config)
            .run_manual(&form(1.0), now())
            .unwrap();

        assert!(run.encoding.zero_filled.iter().any(|c| c == "fbs"));
        assert!(run.encoding.zero_filled.iter().any(|c| c == "exang"));
        assert!(run.encoding.zero_filled.iter().any(|c| c == "sex_Female"));
        assert_eq!(run.encoding.matrix.columns(), &FEATURES[..]);
        assert_eq!(run.encoding.matrix.column("fbs").unwrap(), vec![0.0]);
    }

    #[test]
    fn test_manual_run_rejects_invalid_form() {
        let context = context();
        let config = config();
        let bad = PatientForm {
            ca: 9,
            ..form(1.0)
        };

        let result = ReportPipeline::new(&context, &config).run_manual(&bad, now());
        assert!(matches!(result, Err(ReportError::InvalidInput(_))));
    }

    #[test]
    fn test_batch_run_appends_columns() {
        let context = context();
        let config = config();
        let df = df![
            "id" => [1i64, 2, 3],
            "age" => [63.0, 41.0, 57.0],
            "trestbps" => [145.0, 130.0, 140.0],
            "chol" => [233.0, 204.0, 241.0],
            "thalch" => [150.0, 172.0, 123.0],
            "oldpeak" => [2.3, 1.4, 0.2],
            "ca" => [0.0, 0.0, 0.0],
            "sex" => ["Male", "Female", "Male"],
            "cp" => ["typical angina", "atypical angina", "asymptomatic"],
            "thal" => ["normal", "normal", "reversable defect"],
        ]
        .unwrap();

        let run = ReportPipeline::new(&context, &config)
            .run_batch(df, now())
            .unwrap();

        assert_eq!(run.reports.len(), 3);
        assert_eq!(run.table.shape(), (3, 15));
        assert_eq!(run.reports[0].prediction, Prediction::Disease);
        assert_eq!(run.reports[1].prediction, Prediction::NoDisease);
        assert_eq!(run.reports[0].fields[0], ("id".to_string(), "1".to_string()));
    }

    #[test]
    fn test_batch_table_shows_imputed_values() {
        let context = context();
        let config = config();
        let df = df![
            "age" => [63.0, 41.0, 57.0],
            "trestbps" => [145.0, 130.0, 140.0],
            "chol" => [Some(233.0), None, Some(241.0)],
            "thalch" => [150.0, 172.0, 123.0],
            "oldpeak" => [2.3, 1.4, 0.2],
            "ca" => [0.0, 0.0, 0.0],
            "sex" => ["Male", "Female", "Male"],
            "cp" => [Some("typical angina"), None, Some("asymptomatic")],
            "thal" => ["normal", "normal", "normal"],
            "fbs" => [Some(true), None, Some(false)],
        ]
        .unwrap();

        let run = ReportPipeline::new(&context, &config)
            .run_batch(df, now())
            .unwrap();

        let field = |row: usize, name: &str| {
            run.reports[row]
                .fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(field(1, "chol").parse::<f64>().unwrap(), 237.0);
        assert_eq!(field(1, "cp"), "Unknown");
        assert_eq!(field(1, "fbs"), "0");
        assert_eq!(run.table.column("chol").unwrap().null_count(), 0);
        assert_eq!(run.table.column("fbs").unwrap().dtype(), &DataType::Int32);
    }

    #[test]
    fn test_run_records() {
        let context = context();
        let config = config();
        let records = vec![
            form(2.5).to_record(),
            form(0.5).to_record().with("exang", RawValue::Flag(true)),
        ];

        let run = ReportPipeline::new(&context, &config)
            .run_records(&records, now())
            .unwrap();

        let labels: Vec<Prediction> = run.reports.iter().map(|r| r.prediction).collect();
        assert_eq!(labels, vec![Prediction::Disease, Prediction::NoDisease]);
        assert!(run.encoding.zero_filled.iter().any(|c| c == "fbs"));
        assert!(!run.encoding.zero_filled.iter().any(|c| c == "exang"));
        assert_eq!(run.encoding.matrix.column("exang").unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn test_run_records_empty() {
        let context = context();
        let config = config();

        let run = ReportPipeline::new(&context, &config)
            .run_records(&[], now())
            .unwrap();

        assert!(run.reports.is_empty());
        assert_eq!(run.table.height(), 0);
        assert_eq!(run.table.width(), 9 + 5);
    }

    #[test]
    fn test_batch_missing_field_predicts_nothing() {
        let context = context();
        let config = config();
        let df = df!["age" => [63.0]].unwrap();

        let result = ReportPipeline::new(&context, &config).run_batch(df, now());
        assert!(matches!(result, Err(ReportError::SchemaMismatch { .. })));
    }
}

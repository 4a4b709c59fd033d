//! Label-to-text mapping and report assembly.

use crate::types::Prediction;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Timestamp layout used on every report, e.g. `2026-10-18 14:03:59`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The fixed text attached to one label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportText {
    pub prediction: &'static str,
    pub poetic_summary: &'static str,
    pub doctor_note: &'static str,
    pub companion_message: &'static str,
}

impl ReportText {
    pub const RISK: ReportText = ReportText {
        prediction: "Heart Disease Detected",
        poetic_summary: "💔 A heart that whispers warnings in silence.",
        doctor_note: "Patient shows signs of cardiac risk. Immediate consultation recommended.",
        companion_message: "🌧️ You are not alone. Let your heart be heard. Seek care, seek comfort.",
    };

    pub const STEADY: ReportText = ReportText {
        prediction: "No Disease Detected",
        poetic_summary: "💖 A rhythm steady, untouched by storm.",
        doctor_note: "No immediate cardiac risk detected. Maintain healthy lifestyle and regular checkups.",
        companion_message: "🌸 Your heart sings steady. Keep nurturing its rhythm with kindness.",
    };

    /// Select the text for a label. Nothing but the label is consulted.
    pub fn for_label(label: Prediction) -> &'static ReportText {
        match label {
            Prediction::Disease => &Self::RISK,
            Prediction::NoDisease => &Self::STEADY,
        }
    }
}

/// One finished report. Never mutated after composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Input fields as (label, value) pairs, for display and export.
    pub fields: Vec<(String, String)>,
    #[serde(rename = "Heart_Disease_Prediction")]
    pub prediction: Prediction,
    #[serde(rename = "Prediction_Text")]
    pub prediction_text: &'static str,
    #[serde(rename = "Poetic_Summary")]
    pub poetic_summary: &'static str,
    #[serde(rename = "Doctor_Note")]
    pub doctor_note: &'static str,
    #[serde(rename = "Companion_Message")]
    pub companion_message: &'static str,
    #[serde(rename = "Report_Generated_At")]
    pub generated_at: String,
}

/// Builds reports from labels.
pub struct ReportComposer;

impl ReportComposer {
    /// Format a generation time with [`TIMESTAMP_FORMAT`].
    pub fn timestamp(now: &NaiveDateTime) -> String {
        now.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Compose a single report.
    pub fn compose(
        fields: Vec<(String, String)>,
        label: Prediction,
        now: &NaiveDateTime,
    ) -> Report {
        Self::compose_with_timestamp(fields, label, Self::timestamp(now))
    }

    /// Compose one report per row, all sharing a single timestamp.
    pub fn compose_batch(
        rows: Vec<Vec<(String, String)>>,
        labels: &[Prediction],
        now: &NaiveDateTime,
    ) -> Vec<Report> {
        let generated_at = Self::timestamp(now);
        rows.into_iter()
            .zip(labels)
            .map(|(fields, label)| Self::compose_with_timestamp(fields, *label, generated_at.clone()))
            .collect()
    }

    fn compose_with_timestamp(
        fields: Vec<(String, String)>,
        label: Prediction,
        generated_at: String,
    ) -> Report {
        let text = ReportText::for_label(label);
        Report {
            fields,
            prediction: label,
            prediction_text: text.prediction,
            poetic_summary: text.poetic_summary,
            doctor_note: text.doctor_note,
            companion_message: text.companion_message,
            generated_at,
        }
    }
}

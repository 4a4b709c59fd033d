//! Report composition and export.
//!
//! A [`Report`] pairs an input record with the fixed texts for its
//! predicted label and a generation timestamp. Reports are exported in two
//! shapes:
//!
//! - a PDF for a single manually entered record ([`render_pdf`])
//! - a CSV for a batch, the input columns plus the five report columns
//!   ([`append_report_columns`])
//!
//! # Example
//!
//! ```rust,ignore
//! use heart_report::reporting::{ReportComposer, ReportWriter};
//!
//! let report = ReportComposer::compose(form_fields, label, &now);
//! ReportWriter::new("outputs").write_pdf(&report, "poetic_report.pdf")?;
//! ```

mod composer;
mod export;
mod pdf;
mod table;

pub use composer::{Report, ReportComposer, ReportText, TIMESTAMP_FORMAT};
pub use export::ReportWriter;
pub use pdf::{PDF_TITLE, PdfLine, layout, render_pdf};
pub use table::{REPORT_COLUMNS, append_report_columns, report_frame, row_fields};

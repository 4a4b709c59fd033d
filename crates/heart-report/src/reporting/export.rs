//! Writing reports to disk.

use super::composer::Report;
use super::pdf::render_pdf;
use crate::error::{ReportError, Result};
use polars::prelude::*;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes PDF and CSV reports into an output directory.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Render `report` and write it as `file_name`, replacing any previous file.
    pub fn write_pdf(&self, report: &Report, file_name: &str) -> Result<PathBuf> {
        let bytes = render_pdf(report)?;
        let path = self.prepare(file_name)?;

        let mut file = File::create(&path).map_err(|e| export_error(&path, e))?;
        file.write_all(&bytes).map_err(|e| export_error(&path, e))?;

        info!("PDF report saved: {}", path.display());
        Ok(path)
    }

    /// Write `df` as a CSV with a header row, replacing any previous file.
    pub fn write_csv(&self, df: &mut DataFrame, file_name: &str) -> Result<PathBuf> {
        let path = self.prepare(file_name)?;

        let mut file = File::create(&path).map_err(|e| export_error(&path, e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .with_quote_char(b'"')
            .finish(df)
            .map_err(|e| export_error(&path, e))?;

        info!("CSV report saved: {} ({} rows)", path.display(), df.height());
        Ok(path)
    }

    fn prepare(&self, file_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).map_err(|e| export_error(&self.output_dir, e))?;
        Ok(self.output_dir.join(file_name))
    }
}

fn export_error(path: &Path, e: impl std::fmt::Display) -> ReportError {
    ReportError::ExportFailed(format!("{}: {}", path.display(), e))
}

//! Single-page PDF rendering of a manual report.
//!
//! Built-in PDF fonts only cover Latin-1, so every line passes through
//! [`latin1_only`] and emoji in the fixed texts are dropped from the PDF.
//! The CSV export keeps them.

use super::composer::Report;
use crate::error::{ReportError, Result};
use crate::utils::{latin1_only, wrap_text};
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use std::io::BufWriter;

pub const PDF_TITLE: &str = "Heart Disease Report";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const TOP: f32 = 280.0;
const BOTTOM: f32 = 20.0;
const LEFT: f32 = 20.0;
const WRAP: usize = 85;

/// One line of laid-out text.
#[derive(Debug, Clone, PartialEq)]
pub struct PdfLine {
    pub text: String,
    pub size: f32,
    pub bold: bool,
    pub indent: f32,
    /// Vertical space consumed after the line, in millimetres.
    pub advance: f32,
}

impl PdfLine {
    fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: 10.0,
            bold: false,
            indent: 0.0,
            advance: 5.5,
        }
    }

    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            size: 11.0,
            bold: true,
            indent: 0.0,
            advance: 6.0,
        }
    }
}

/// Lay out a report as lines, top to bottom.
pub fn layout(report: &Report) -> Vec<PdfLine> {
    let mut lines = vec![PdfLine {
        text: PDF_TITLE.to_string(),
        size: 14.0,
        bold: true,
        indent: 0.0,
        advance: 12.0,
    }];

    for (label, value) in &report.fields {
        lines.push(PdfLine::body(format!("{}: {}", label, value)));
    }
    if let Some(last) = lines.last_mut() {
        last.advance += 4.0;
    }

    lines.push(PdfLine {
        advance: 10.0,
        ..PdfLine::heading(format!("Prediction: {}", report.prediction_text))
    });

    for (heading, body) in [
        ("Poetic Summary:", report.poetic_summary),
        ("Doctor's Note:", report.doctor_note),
        ("Companion Message:", report.companion_message),
    ] {
        lines.push(PdfLine::heading(heading));
        for wrapped in wrap_text(body, WRAP) {
            lines.push(PdfLine {
                indent: 5.0,
                ..PdfLine::body(wrapped)
            });
        }
        if let Some(last) = lines.last_mut() {
            last.advance += 4.0;
        }
    }

    lines.push(PdfLine {
        size: 9.0,
        ..PdfLine::body(format!("Report Generated At: {}", report.generated_at))
    });

    for line in &mut lines {
        line.text = latin1_only(&line.text);
    }
    lines
}

/// Render a report to PDF bytes.
pub fn render_pdf(report: &Report) -> Result<Vec<u8>> {
    let (doc, page1, layer1) =
        PdfDocument::new(PDF_TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::ExportFailed(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::ExportFailed(format!("PDF font error: {e}")))?;

    let mut layer: PdfLayerReference = doc.get_page(page1).get_layer(layer1);
    let mut y = TOP;

    for line in layout(report) {
        if y < BOTTOM {
            let (page, next) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            layer = doc.get_page(page).get_layer(next);
            y = TOP;
        }
        let face: &IndirectFontRef = if line.bold { &bold } else { &font };
        layer.use_text(&line.text, line.size, Mm(LEFT + line.indent), Mm(y), face);
        y -= line.advance;
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::ExportFailed(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::ExportFailed(format!("PDF buffer error: {e}")))
}

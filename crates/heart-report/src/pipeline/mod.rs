//! Pipeline module.
//!
//! This module wires the normalizer, the loaded artifacts and the report
//! composer into the manual and batch runs.

mod loader;
mod runner;

pub use loader::load_csv;
pub use runner::{BatchRun, Inference, ManualRun, ReportPipeline};

//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a clinic-themed interface for:
//! - Image intake (typed path or file dropped onto the terminal)
//! - The patient questionnaire and analysis results
//! - A browser of the lesion types the model recognises

mod app;
mod styles;
mod ui;
mod worker;

pub use app::{App, Screen};
pub use styles::MedicalTheme;
pub use worker::{AnalysisPoll, AnalysisProgress, AnalysisWorker, AnalysisWorkerHandle, PreviewDecoder};

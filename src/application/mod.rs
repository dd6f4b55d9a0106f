//! Application layer: Use cases and view-models.
//!
//! This module orchestrates domain logic with ports to implement
//! the upload-and-analyze flow and the lesion type browser.

mod analysis;
pub mod flow;
mod preview;
mod selector;

pub use analysis::{AnalysisService, AnalysisStage};
pub use flow::{
    Alert, AlertKind, PreviewState, PreviewTicket, ResultsRegion, ResultsView, ScrollTarget,
    Submission, SubmitControl, UploadAndAnalyzeFlow,
};
pub use preview::{decode_preview, Preview};
pub use selector::{panel_id, DetailPanel, LesionTypeSelector, SelectorButton};

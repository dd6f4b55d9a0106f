//! Domain layer: Core types for skin lesion analysis.
//!
//! Pure data and validation rules; no I/O beyond probing a selected file.

mod lesion;
mod prediction;
mod submission;
mod upload;

pub use lesion::LesionType;
pub use prediction::{explanation, format_percentage, PredictionResult, RiskTier, PLACEHOLDER_HEATMAP};
pub use submission::{ClinicalFields, SubmissionPayload};
pub use upload::{
    is_image_type, media_type_for_path, validate_intake, FileHandle, IntakeError, IntakeSource,
    UploadedFile, MAX_UPLOAD_BYTES,
};

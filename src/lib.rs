//! # DermaDetect
//!
//! Terminal client for AI-assisted skin lesion analysis.
//!
//! This crate provides:
//! - Image intake with client-side size/type validation and previews
//! - A short clinical questionnaire assembled into one submission
//! - The upload-then-predict exchange with the remote analysis service
//! - Risk-banded rendering of the returned classification
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (UploadedFile, SubmissionPayload, PredictionResult, RiskTier)
//! - `ports`: Trait definitions for external operations
//! - `adapters`: Concrete implementations (reqwest HTTP client, log sanitizer)
//! - `application`: Use cases and the view-model driving the UI
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{PredictionResult, RiskTier, SubmissionPayload, UploadedFile};

/// Result type for DermaDetect operations
pub type Result<T> = std::result::Result<T, DermadetectError>;

/// Main error type for DermaDetect
#[derive(Debug, thiserror::Error)]
pub enum DermadetectError {
    #[error("Invalid upload: {0}")]
    Intake(#[from] domain::IntakeError),

    #[error("Analysis service error: {0}")]
    Api(#[from] ports::ApiError),

    #[error("Upload was not accepted: {0}")]
    UploadRefused(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

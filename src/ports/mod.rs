//! Ports layer: Trait definitions for external operations.
//!
//! Following Hexagonal Architecture, these traits define the boundary
//! between the application and the remote analysis service.

mod analysis_api;

pub use analysis_api::{AnalysisApi, ApiError, UploadReceipt};

#[cfg(test)]
pub(crate) use analysis_api::testing;

//! Adapters layer: Concrete implementations of ports.
//!
//! - `http`: reqwest client for the analysis service
//! - `sanitize`: secret/PII filtering for logs

pub mod http;
pub mod sanitize;

pub use http::HttpAnalysisApi;

//! HTTP adapter: Implementation of `AnalysisApi` over reqwest.
//!
//! Both endpoints receive the same multipart body: the image as `file`,
//! the questionnaire as text parts, and `symptoms` as a JSON array string.

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;

use crate::config::ApiConfig;
use crate::domain::{PredictionResult, SubmissionPayload};
use crate::ports::{AnalysisApi, ApiError, UploadReceipt};

/// Longest response body kept in a `Rejected` error.
const MAX_ERROR_BODY: usize = 512;

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

/// Blocking client for the analysis service.
pub struct HttpAnalysisApi {
    client: Client,
    base_url: String,
    upload_path: String,
    predict_path: String,
}

impl HttpAnalysisApi {
    /// Build a client for the configured service.
    ///
    /// # Errors
    /// Returns `ApiError::Transport` if the TLS backend cannot be initialized.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("dermadetect/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_path: config.upload_path.clone(),
            predict_path: config.predict_path.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn build_form(payload: &SubmissionPayload) -> Result<Form, ApiError> {
        let file = Part::bytes(payload.file.bytes().to_vec())
            .file_name(payload.file.name.clone())
            .mime_str(&payload.file.media_type)
            .map_err(|e| ApiError::Payload(e.to_string()))?;

        let fields = payload
            .text_fields()
            .map_err(|e| ApiError::Payload(e.to_string()))?;

        Ok(fields
            .into_iter()
            .fold(Form::new().part("file", file), |form, (name, value)| {
                form.text(name, value)
            }))
    }

    /// POST the payload and return the body of a successful response.
    fn post(&self, path: &str, payload: &SubmissionPayload) -> Result<String, ApiError> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, bytes = payload.file.size(), "Posting analysis payload");

        let response = self
            .client
            .post(&url)
            .multipart(Self::build_form(payload)?)
            .send()?;

        let status = response.status();
        let mut body = response.text()?;

        if !status.is_success() {
            if body.len() > MAX_ERROR_BODY {
                let mut end = MAX_ERROR_BODY;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body.truncate(end);
            }
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

impl AnalysisApi for HttpAnalysisApi {
    fn upload(&self, payload: &SubmissionPayload) -> Result<UploadReceipt, ApiError> {
        let body = self.post(&self.upload_path, payload)?;
        Ok(serde_json::from_str(&body)?)
    }

    fn predict(&self, payload: &SubmissionPayload) -> Result<PredictionResult, ApiError> {
        let body = self.post(&self.predict_path, payload)?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:5000/".to_string(),
            ..ApiConfig::default()
        };
        let api = HttpAnalysisApi::new(&config).expect("Should build client");
        assert_eq!(api.endpoint("/upload"), "http://localhost:5000/upload");
        assert_eq!(api.endpoint("predict"), "http://localhost:5000/predict");
    }

    #[test]
    fn test_unreachable_service_is_transport_error() {
        let config = ApiConfig {
            // Port 9 (discard) is almost never listening locally.
            base_url: "http://127.0.0.1:9".to_string(),
            ..ApiConfig::default()
        };
        let api = HttpAnalysisApi::new(&config).expect("Should build client");
        let payload = SubmissionPayload::new(
            crate::domain::UploadedFile::new("a.png", "image/png", vec![0; 8]),
            Default::default(),
            Vec::new(),
        );
        let err = api.upload(&payload).expect_err("Nothing is listening");
        assert!(matches!(err, ApiError::Transport(_)));
    }
}

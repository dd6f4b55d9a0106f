//! Analysis API port: Trait for the remote upload and prediction endpoints.
//!
//! This trait abstracts the HTTP transport (reqwest) from the application logic.

use serde::{Deserialize, Serialize};

use crate::domain::{PredictionResult, SubmissionPayload};

/// Errors raised while talking to the analysis service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid payload: {0}")]
    Payload(String),
}

/// Acknowledgement returned by the upload endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Whether the service accepted the upload
    #[serde(default)]
    pub success: bool,

    /// Stored file name, when accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Reason for refusal, when not accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Remote analysis service.
///
/// Both calls are blocking; callers run them off the UI thread.
pub trait AnalysisApi: Send + Sync {
    /// Upload the image and questionnaire.
    ///
    /// # Errors
    /// Returns `ApiError` on transport failure or a non-success HTTP status.
    fn upload(&self, payload: &SubmissionPayload) -> Result<UploadReceipt, ApiError>;

    /// Request a prediction for the same payload.
    ///
    /// # Errors
    /// Returns `ApiError` on transport failure, a non-success HTTP status,
    /// or an unparseable body.
    fn predict(&self, payload: &SubmissionPayload) -> Result<PredictionResult, ApiError>;
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted in-process service used by unit tests.

    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Call {
        Upload,
        Predict,
    }

    pub struct ScriptedApi {
        upload: Mutex<Option<Result<UploadReceipt, ApiError>>>,
        predict: Mutex<Option<Result<PredictionResult, ApiError>>>,
        pub calls: Mutex<Vec<Call>>,
    }

    impl ScriptedApi {
        pub fn new(
            upload: Result<UploadReceipt, ApiError>,
            predict: Result<PredictionResult, ApiError>,
        ) -> Self {
            Self {
                upload: Mutex::new(Some(upload)),
                predict: Mutex::new(Some(predict)),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn accepting(predict: PredictionResult) -> Self {
            Self::new(
                Ok(UploadReceipt {
                    success: true,
                    filename: Some("upload.jpg".to_string()),
                    error: None,
                }),
                Ok(predict),
            )
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("calls lock").clone()
        }
    }

    impl AnalysisApi for ScriptedApi {
        fn upload(&self, _payload: &SubmissionPayload) -> Result<UploadReceipt, ApiError> {
            self.calls.lock().expect("calls lock").push(Call::Upload);
            self.upload
                .lock()
                .expect("upload lock")
                .take()
                .unwrap_or_else(|| Err(ApiError::Transport("script exhausted".to_string())))
        }

        fn predict(&self, _payload: &SubmissionPayload) -> Result<PredictionResult, ApiError> {
            self.calls.lock().expect("calls lock").push(Call::Predict);
            self.predict
                .lock()
                .expect("predict lock")
                .take()
                .unwrap_or_else(|| Err(ApiError::Transport("script exhausted".to_string())))
        }
    }
}

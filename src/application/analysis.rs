//! Analysis service: Orchestrates the remote upload/predict sequence.
//!
//! Steps run strictly in order, each one settling before the next starts:
//! 1. Upload the payload
//! 2. Pause for the configured pacing delay
//! 3. Request the prediction for the same payload
//!
//! There are no retries. A refused upload ends the sequence before the
//! prediction endpoint is contacted.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{PredictionResult, SubmissionPayload};
use crate::ports::AnalysisApi;
use crate::DermadetectError;

/// Step of the remote sequence, reported as it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStage {
    Uploading,
    Pacing,
    Predicting,
}

/// Service for running one analysis against the remote API.
pub struct AnalysisService<A>
where
    A: AnalysisApi,
{
    api: Arc<A>,
    pacing: Duration,
}

impl<A> AnalysisService<A>
where
    A: AnalysisApi,
{
    /// Create a new analysis service.
    ///
    /// `pacing` is an artificial pause before the prediction call and may be zero.
    pub fn new(api: Arc<A>, pacing: Duration) -> Self {
        Self { api, pacing }
    }

    /// Run the sequence without progress reporting.
    ///
    /// # Errors
    /// See [`AnalysisService::run_with_progress`].
    pub fn run(&self, payload: &SubmissionPayload) -> Result<PredictionResult, DermadetectError> {
        self.run_with_progress(payload, |_| {})
    }

    /// Run the sequence, calling `on_stage` as each step begins.
    ///
    /// # Errors
    /// Returns `DermadetectError::Api` on transport or HTTP failure and
    /// `DermadetectError::UploadRefused` if the upload was not accepted.
    pub fn run_with_progress<F>(
        &self,
        payload: &SubmissionPayload,
        mut on_stage: F,
    ) -> Result<PredictionResult, DermadetectError>
    where
        F: FnMut(AnalysisStage),
    {
        tracing::info!(
            media_type = %payload.file.media_type,
            bytes = payload.file.size(),
            symptoms = payload.symptoms.len(),
            "Starting analysis"
        );

        on_stage(AnalysisStage::Uploading);
        let receipt = self.api.upload(payload)?;
        if !receipt.success {
            let reason = receipt
                .error
                .unwrap_or_else(|| "upload not acknowledged".to_string());
            tracing::warn!(%reason, "Upload refused; skipping prediction");
            return Err(DermadetectError::UploadRefused(reason));
        }
        tracing::debug!(stored_as = ?receipt.filename, "Upload accepted");

        if !self.pacing.is_zero() {
            on_stage(AnalysisStage::Pacing);
            std::thread::sleep(self.pacing);
        }

        on_stage(AnalysisStage::Predicting);
        let prediction = self.api.predict(payload)?;

        tracing::info!(
            probability = prediction.probability,
            tier = %prediction.risk_tier(),
            "Analysis complete"
        );

        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClinicalFields, UploadedFile};
    use crate::ports::testing::{Call, ScriptedApi};
    use crate::ports::{ApiError, UploadReceipt};

    fn payload() -> SubmissionPayload {
        SubmissionPayload::new(
            UploadedFile::new("mole.jpg", "image/jpeg", vec![0xFF, 0xD8]),
            ClinicalFields::default(),
            vec!["Itching".to_string()],
        )
    }

    #[test]
    fn test_successful_sequence_reports_stages_in_order() {
        let api = Arc::new(ScriptedApi::accepting(PredictionResult::new("Melanoma", 0.82)));
        let service = AnalysisService::new(api.clone(), Duration::from_millis(1));

        let mut stages = Vec::new();
        let result = service
            .run_with_progress(&payload(), |s| stages.push(s))
            .expect("Should succeed");

        assert_eq!(result.label(), "Melanoma");
        assert_eq!(
            stages,
            [
                AnalysisStage::Uploading,
                AnalysisStage::Pacing,
                AnalysisStage::Predicting
            ]
        );
        assert_eq!(api.calls(), [Call::Upload, Call::Predict]);
    }

    #[test]
    fn test_zero_pacing_skips_pause() {
        let api = Arc::new(ScriptedApi::accepting(PredictionResult::new("Nevus", 0.1)));
        let service = AnalysisService::new(api, Duration::ZERO);

        let mut stages = Vec::new();
        service
            .run_with_progress(&payload(), |s| stages.push(s))
            .expect("Should succeed");
        assert_eq!(stages, [AnalysisStage::Uploading, AnalysisStage::Predicting]);
    }

    #[test]
    fn test_refused_upload_never_predicts() {
        let api = Arc::new(ScriptedApi::new(
            Ok(UploadReceipt {
                success: false,
                filename: None,
                error: Some("Invalid file type".to_string()),
            }),
            Ok(PredictionResult::new("Melanoma", 0.9)),
        ));
        let service = AnalysisService::new(api.clone(), Duration::ZERO);

        let err = service.run(&payload()).expect_err("Should fail");
        assert!(matches!(err, DermadetectError::UploadRefused(ref r) if r == "Invalid file type"));
        assert_eq!(api.calls(), [Call::Upload]);
    }

    #[test]
    fn test_transport_failure_on_upload_never_predicts() {
        let api = Arc::new(ScriptedApi::new(
            Err(ApiError::Transport("connection refused".to_string())),
            Ok(PredictionResult::new("Melanoma", 0.9)),
        ));
        let service = AnalysisService::new(api.clone(), Duration::ZERO);

        assert!(matches!(
            service.run(&payload()),
            Err(DermadetectError::Api(ApiError::Transport(_)))
        ));
        assert_eq!(api.calls(), [Call::Upload]);
    }

    #[test]
    fn test_prediction_failure_propagates() {
        let api = Arc::new(ScriptedApi::new(
            Ok(UploadReceipt {
                success: true,
                ..Default::default()
            }),
            Err(ApiError::Rejected {
                status: 500,
                body: "boom".to_string(),
            }),
        ));
        let service = AnalysisService::new(api.clone(), Duration::ZERO);

        assert!(service.run(&payload()).is_err());
        assert_eq!(api.calls(), [Call::Upload, Call::Predict]);
    }
}

//! Upload-and-analyze view-model.
//!
//! Holds every piece of user-visible state for the analysis screen so the
//! whole lifecycle (intake, submission, rendering) can be driven and checked
//! without a terminal. The TUI reads this state to draw and forwards user
//! events and worker results into it.
//!
//! The only shared mutable slot is the current file: written by intake and
//! removal, read by submission. All access happens on the UI thread.

use std::path::Path;
use std::time::{Duration, Instant};

use crate::domain::{
    explanation, validate_intake, ClinicalFields, FileHandle, IntakeError, IntakeSource,
    PredictionResult, RiskTier, SubmissionPayload, UploadedFile,
};
use crate::DermadetectError;

use super::preview::Preview;

/// Idle label of the submit control.
pub const SUBMIT_LABEL: &str = "Start AI Analysis";

/// Label of the submit control while a submission is in flight.
pub const BUSY_LABEL: &str = "Analyzing...";

/// The one message shown for every remote failure.
pub const ANALYSIS_FAILED: &str = "An error occurred during analysis. Please try again.";

/// Pause before the confidence bar starts filling.
pub const BAR_REVEAL_DELAY: Duration = Duration::from_millis(100);

/// Time constant of the bar's ease-out fill.
const BAR_FILL_TAU_SECS: f64 = 0.15;

/// Preview panel state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    /// No file selected
    Placeholder,
    /// File stored, preview still decoding
    Loading,
    Ready(Preview),
    /// File stored but not decodable for display
    Unavailable(String),
}

/// Work item for the preview decoder. Only the latest generation is applied.
#[derive(Debug, Clone)]
pub struct PreviewTicket {
    pub generation: u64,
    pub file: UploadedFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: &'static str,
}

impl Default for SubmitControl {
    fn default() -> Self {
        Self {
            enabled: true,
            label: SUBMIT_LABEL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    /// Pre-submit validation (distinct message per cause)
    Validation,
    /// Remote failure (always `ANALYSIS_FAILED`)
    Failure,
}

/// A user-visible message awaiting acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

/// Region the UI should bring into view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollTarget {
    Results,
}

/// Confidence bar with a delayed ease-out fill.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceBar {
    target: f64,
    width: f64,
    text: Option<String>,
    reveal_at: Instant,
}

impl ConfidenceBar {
    fn new(target: f64, text: String, now: Instant) -> Self {
        Self {
            target: target.clamp(0.0, 100.0),
            width: 0.0,
            text: Some(text),
            reveal_at: now + BAR_REVEAL_DELAY,
        }
    }

    /// Advance the animation. Returns true if the bar changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now < self.reveal_at || self.width >= self.target {
            return false;
        }

        let elapsed = now.saturating_duration_since(self.reveal_at).as_secs_f64();
        let k = 1.0 - (-elapsed / BAR_FILL_TAU_SECS).exp();
        let mut width = (self.target * k).max(self.width);
        if self.target - width < 0.05 {
            width = self.target;
        }

        let changed = (width - self.width).abs() > f64::EPSILON;
        self.width = width;
        changed
    }

    /// Current fill in percent (0 to 100).
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Percentage text, shown once the reveal delay has passed.
    #[must_use]
    pub fn text(&self, now: Instant) -> Option<&str> {
        if now >= self.reveal_at {
            self.text.as_deref()
        } else {
            None
        }
    }

    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.width >= self.target
    }
}

/// Rendered analysis outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub label: String,
    pub percentage_text: String,
    /// Single active tier; replacing the view replaces the styling
    pub tier: RiskTier,
    pub bar: ConfidenceBar,
    pub explanation: Vec<String>,
    pub heatmap: String,
    pub confidence: Option<String>,
}

impl ResultsView {
    #[must_use]
    pub fn from_prediction(prediction: &PredictionResult, now: Instant) -> Self {
        let percentage_text = prediction.percentage_text();
        let label = prediction.label().to_string();

        Self {
            explanation: explanation(&label, &percentage_text),
            bar: ConfidenceBar::new(prediction.percentage(), percentage_text.clone(), now),
            tier: prediction.risk_tier(),
            heatmap: prediction.heatmap_or_placeholder().to_string(),
            confidence: prediction.confidence.clone(),
            label,
            percentage_text,
        }
    }
}

/// Results region visibility.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsRegion {
    Hidden,
    /// Skeleton visible, final results hidden
    Loading,
    Ready(ResultsView),
}

/// A submission accepted by the flow and handed to the worker.
#[derive(Debug, Clone)]
pub struct Submission {
    pub attempt: u64,
    pub payload: SubmissionPayload,
}

/// State container for the upload-and-analyze lifecycle.
#[derive(Debug)]
pub struct UploadAndAnalyzeFlow {
    file: Option<UploadedFile>,
    file_input: String,
    preview: PreviewState,
    preview_generation: u64,
    submit: SubmitControl,
    results: ResultsRegion,
    alert: Option<Alert>,
    scroll: Option<ScrollTarget>,
    attempts: u64,
    in_flight: Option<u64>,
}

impl Default for UploadAndAnalyzeFlow {
    fn default() -> Self {
        Self {
            file: None,
            file_input: String::new(),
            preview: PreviewState::Placeholder,
            preview_generation: 0,
            submit: SubmitControl::default(),
            results: ResultsRegion::Hidden,
            alert: None,
            scroll: None,
            attempts: 0,
            in_flight: None,
        }
    }
}

impl UploadAndAnalyzeFlow {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Accessors ===

    #[must_use]
    pub fn file(&self) -> Option<&UploadedFile> {
        self.file.as_ref()
    }

    #[must_use]
    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    #[must_use]
    pub fn submit_control(&self) -> SubmitControl {
        self.submit
    }

    #[must_use]
    pub fn results(&self) -> &ResultsRegion {
        &self.results
    }

    #[must_use]
    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    /// Acknowledge and clear the pending alert.
    pub fn take_alert(&mut self) -> Option<Alert> {
        self.alert.take()
    }

    /// Consume the pending scroll request.
    pub fn take_scroll_request(&mut self) -> Option<ScrollTarget> {
        self.scroll.take()
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Text of the path input control.
    #[must_use]
    pub fn file_input(&self) -> &str {
        &self.file_input
    }

    pub fn file_input_mut(&mut self) -> &mut String {
        &mut self.file_input
    }

    fn raise(&mut self, kind: AlertKind, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(?kind, %message, "Alert raised");
        self.alert = Some(Alert { kind, message });
    }

    // === Intake ===

    /// Validate and store a file, replacing any previous one.
    ///
    /// On success the preview becomes `Loading` and the returned ticket must be
    /// decoded and passed back through [`apply_preview`](Self::apply_preview).
    ///
    /// # Errors
    /// Returns the failed check; the stored file is left unchanged.
    pub fn intake(
        &mut self,
        file: UploadedFile,
        source: IntakeSource,
    ) -> Result<PreviewTicket, IntakeError> {
        if let Err(e) = validate_intake(file.size(), &file.media_type, source) {
            tracing::info!(reason = ?e, ?source, "Intake rejected");
            self.raise(AlertKind::Validation, e.to_string());
            return Err(e);
        }

        self.preview_generation += 1;
        self.preview = PreviewState::Loading;
        self.file = Some(file.clone());

        tracing::info!(
            media_type = %file.media_type,
            bytes = file.size(),
            ?source,
            "Image accepted"
        );

        Ok(PreviewTicket {
            generation: self.preview_generation,
            file,
        })
    }

    /// Probe, validate and read a file from disk, then store it.
    ///
    /// Size and type are checked from metadata before the contents are read.
    ///
    /// # Errors
    /// Returns the failed check; the stored file is left unchanged.
    pub fn intake_path(
        &mut self,
        path: impl AsRef<Path>,
        source: IntakeSource,
    ) -> Result<PreviewTicket, IntakeError> {
        let path = path.as_ref();
        let loaded = FileHandle::probe(path).and_then(|handle| {
            validate_intake(handle.size, &handle.media_type, source)?;
            handle.read()
        });

        let file = match loaded {
            Ok(file) => file,
            Err(e) => {
                tracing::info!(reason = ?e, ?source, "Intake rejected");
                self.raise(AlertKind::Validation, e.to_string());
                return Err(e);
            }
        };

        let ticket = self.intake(file, source)?;
        self.file_input = path.display().to_string();
        Ok(ticket)
    }

    /// Apply a decoded preview. Stale generations are ignored.
    ///
    /// Returns true if the preview was applied.
    pub fn apply_preview(&mut self, generation: u64, result: Result<Preview, String>) -> bool {
        if generation != self.preview_generation || self.file.is_none() {
            tracing::trace!(generation, current = self.preview_generation, "Stale preview dropped");
            return false;
        }

        self.preview = match result {
            Ok(preview) => PreviewState::Ready(preview),
            Err(reason) => {
                tracing::warn!(%reason, "Preview unavailable");
                PreviewState::Unavailable(reason)
            }
        };
        true
    }

    /// Clear the selected file and restore the placeholder. Idempotent.
    pub fn remove_file(&mut self) {
        if self.file.take().is_some() {
            tracing::info!("Image removed");
        }
        self.preview_generation += 1;
        self.file_input.clear();
        self.preview = PreviewState::Placeholder;
    }

    // === Submission ===

    /// Start a submission with the form values as they are now.
    ///
    /// Returns `None` without side effects while another submission is in
    /// flight, and `None` with a validation alert when no file is selected.
    pub fn begin_submission(
        &mut self,
        fields: ClinicalFields,
        symptoms: impl IntoIterator<Item = String>,
    ) -> Option<Submission> {
        if !self.submit.enabled || self.in_flight.is_some() {
            return None;
        }

        let Some(file) = self.file.clone() else {
            self.raise(AlertKind::Validation, IntakeError::MissingFile.to_string());
            return None;
        };

        let payload = SubmissionPayload::new(file, fields, symptoms);

        self.attempts += 1;
        let attempt = self.attempts;
        self.in_flight = Some(attempt);

        self.submit = SubmitControl {
            enabled: false,
            label: BUSY_LABEL,
        };
        self.results = ResultsRegion::Loading;
        self.scroll = Some(ScrollTarget::Results);

        tracing::info!(attempt, "Submission started");
        Some(Submission { attempt, payload })
    }

    /// Settle a submission. Cleanup runs once per attempt; repeated or
    /// unknown attempts are ignored.
    ///
    /// Returns true if the outcome was applied.
    pub fn finish_submission(
        &mut self,
        attempt: u64,
        outcome: Result<PredictionResult, DermadetectError>,
        now: Instant,
    ) -> bool {
        if self.in_flight != Some(attempt) {
            tracing::debug!(attempt, "Ignoring outcome of settled submission");
            return false;
        }

        match outcome {
            Ok(prediction) => self.render(&prediction, now),
            Err(e) => {
                tracing::error!(attempt, error = %e, "Analysis failed");
                self.raise(AlertKind::Failure, ANALYSIS_FAILED);
                self.results = ResultsRegion::Hidden;
            }
        }

        self.in_flight = None;
        self.submit = SubmitControl::default();
        true
    }

    // === Rendering ===

    /// Switch the results region to the final view for `prediction`.
    pub fn render(&mut self, prediction: &PredictionResult, now: Instant) {
        let view = ResultsView::from_prediction(prediction, now);
        tracing::debug!(tier = %view.tier, pct = %view.percentage_text, "Rendering results");
        self.results = ResultsRegion::Ready(view);
    }

    /// Advance animations. Returns true if anything visible changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match &mut self.results {
            ResultsRegion::Ready(view) => view.bar.tick(now),
            _ => false,
        }
    }
}

//! Background workers for the blocking parts of the flow.
//!
//! The remote analysis and the preview decode both run on their own threads
//! and report over channels that the main loop polls each frame, so the UI
//! stays responsive while they are pending.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::application::{decode_preview, AnalysisService, AnalysisStage, Preview, PreviewTicket, Submission};
use crate::domain::PredictionResult;
use crate::ports::AnalysisApi;
use crate::DermadetectError;

/// Progress updates from the analysis worker.
#[derive(Debug)]
pub enum AnalysisProgress {
    /// A step of the remote sequence has started
    Stage(AnalysisStage),
    /// The sequence settled
    Finished(Result<PredictionResult, DermadetectError>),
}

/// Result of polling a running analysis.
#[derive(Debug)]
pub enum AnalysisPoll {
    Pending,
    Progress(AnalysisProgress),
    /// The worker went away without reporting an outcome
    Lost,
}

/// Handle to a running analysis worker.
pub struct AnalysisWorkerHandle {
    /// Submission attempt this worker serves
    pub attempt: u64,
    progress_rx: Receiver<AnalysisProgress>,
    _handle: JoinHandle<()>,
}

impl AnalysisWorkerHandle {
    /// Try to receive the next progress update (non-blocking).
    pub fn poll(&self) -> AnalysisPoll {
        match self.progress_rx.try_recv() {
            Ok(progress) => AnalysisPoll::Progress(progress),
            Err(TryRecvError::Empty) => AnalysisPoll::Pending,
            Err(TryRecvError::Disconnected) => AnalysisPoll::Lost,
        }
    }
}

/// Runs one submission against the analysis service.
pub struct AnalysisWorker;

impl AnalysisWorker {
    /// Spawn a background analysis task.
    pub fn spawn<A>(service: Arc<AnalysisService<A>>, submission: Submission) -> AnalysisWorkerHandle
    where
        A: AnalysisApi + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let attempt = submission.attempt;

        let handle = thread::spawn(move || {
            let outcome = service.run_with_progress(&submission.payload, |stage| {
                let _ = tx.send(AnalysisProgress::Stage(stage));
            });
            let _ = tx.send(AnalysisProgress::Finished(outcome));
        });

        AnalysisWorkerHandle {
            attempt,
            progress_rx: rx,
            _handle: handle,
        }
    }
}

/// Decoded preview tagged with the intake generation it belongs to.
pub type PreviewOutcome = (u64, Result<Preview, String>);

/// Decodes previews off the UI thread.
///
/// All decodes share one channel; superseded results still arrive and are
/// discarded by the flow's generation check.
pub struct PreviewDecoder {
    tx: Sender<PreviewOutcome>,
    rx: Receiver<PreviewOutcome>,
}

impl Default for PreviewDecoder {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }
}

impl PreviewDecoder {
    /// Start decoding `ticket` in the background.
    pub fn spawn(&self, ticket: PreviewTicket) {
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = decode_preview(&ticket.file);
            let _ = tx.send((ticket.generation, result));
        });
    }

    /// Next finished decode, if any (non-blocking).
    #[must_use]
    pub fn try_recv(&self) -> Option<PreviewOutcome> {
        self.rx.try_recv().ok()
    }
}

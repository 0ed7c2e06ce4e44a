use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::audio::{AudioEncoder, CaptureBackend, CaptureHandle, RecordingLimits};
use crate::error::AnswerError;
use crate::recognition::{Recognition, Recognizer};

/// Where a voice answer currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerState {
    /// Ready to record
    Idle,
    /// Microphone capture in progress
    Recording,
    /// Recording sent, waiting for recognized text
    AwaitingResult,
}

/// Drives one voice answer at a time: capture, encode, validate, recognize
pub struct AnswerController<C, R> {
    capture: C,
    recognizer: R,
    limits: RecordingLimits,
    state: AnswerState,
    handle: Option<CaptureHandle>,
}

impl<C: CaptureBackend, R: Recognizer> AnswerController<C, R> {
    pub fn new(capture: C, recognizer: R, limits: RecordingLimits) -> Self {
        Self {
            capture,
            recognizer,
            limits,
            state: AnswerState::Idle,
            handle: None,
        }
    }

    pub fn state(&self) -> AnswerState {
        self.state
    }

    /// Idle → Recording
    pub async fn start_recording(&mut self) -> Result<(), AnswerError> {
        if self.state != AnswerState::Idle {
            warn!("Recording requested while {:?}", self.state);
            return Err(AnswerError::Busy(self.state));
        }

        let handle = self.capture.begin().await?;
        self.handle = Some(handle);
        self.state = AnswerState::Recording;

        info!("Recording started ({} capture)", self.capture.name());
        Ok(())
    }

    /// Recording → AwaitingResult → Idle
    ///
    /// The controller is back in `Idle` when this returns, whether the answer
    /// was recognized or not.
    pub async fn finish_and_submit(&mut self) -> Result<Recognition, AnswerError> {
        let handle = match (self.state, self.handle.take()) {
            (AnswerState::Recording, Some(handle)) => handle,
            _ => return Err(AnswerError::NotRecording),
        };

        let result = {
            let _awaiting = AwaitingResult::enter(&mut self.state);
            submit(&mut self.capture, &self.recognizer, &self.limits, handle).await
        };

        if let Err(e) = &result {
            error!("Voice answer failed: {}", e);
        }
        result
    }
}

/// Holds the controller in `AwaitingResult`; back to `Idle` on drop, even
/// when the submission future is cancelled midway.
struct AwaitingResult<'a>(&'a mut AnswerState);

impl<'a> AwaitingResult<'a> {
    fn enter(state: &'a mut AnswerState) -> Self {
        *state = AnswerState::AwaitingResult;
        Self(state)
    }
}

impl Drop for AwaitingResult<'_> {
    fn drop(&mut self) {
        *self.0 = AnswerState::Idle;
    }
}

async fn submit<C: CaptureBackend, R: Recognizer>(
    capture: &mut C,
    recognizer: &R,
    limits: &RecordingLimits,
    handle: CaptureHandle,
) -> Result<Recognition, AnswerError> {
    let raw = capture.finish(handle).await?;
    let container = AudioEncoder::encode(&raw)?;

    let analysis = limits.analyze(&container);
    limits.validate(&analysis)?;

    Ok(recognizer.recognize(&container).await?)
}

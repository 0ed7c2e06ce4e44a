// Integration tests for the voice answer flow
//
// A recording on disk is captured, encoded, checked and handed to a
// recognizer, driving the controller through all of its states.

mod common;

use anyhow::Result;
use common::{spoken_answer_wav, tone, wav_bytes};
use quiz_voice::audio::{FileCapture, PcmContainer, RecordingLimits};
use quiz_voice::error::{AnswerError, RecognitionError, RecordingRejected};
use quiz_voice::recognition::{Recognition, Recognizer};
use quiz_voice::{AnswerController, AnswerState};
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Remembers every container it was asked to recognize
#[derive(Clone, Default)]
struct RecordingRecognizer {
    received: Arc<Mutex<Vec<Vec<u8>>>>,
}

#[async_trait::async_trait]
impl Recognizer for RecordingRecognizer {
    async fn recognize(&self, container: &PcmContainer) -> Result<Recognition, RecognitionError> {
        self.received
            .lock()
            .unwrap()
            .push(container.as_bytes().to_vec());
        Ok(Recognition {
            text: "gajah".to_string(),
            confidence: 0.87,
        })
    }
}

struct FailingRecognizer;

#[async_trait::async_trait]
impl Recognizer for FailingRecognizer {
    async fn recognize(&self, _: &PcmContainer) -> Result<Recognition, RecognitionError> {
        Err(RecognitionError::Rejected("speech not understood".to_string()))
    }
}

#[tokio::test]
async fn test_file_recording_is_recognized() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("answer.wav");
    fs::write(&path, spoken_answer_wav()?)?;

    let mut controller = AnswerController::new(
        FileCapture::new(&path),
        RecordingRecognizer::default(),
        RecordingLimits::default(),
    );

    controller.start_recording().await?;
    assert_eq!(controller.state(), AnswerState::Recording);

    let recognition = controller.finish_and_submit().await?;
    assert_eq!(recognition.text, "gajah");
    assert_eq!(controller.state(), AnswerState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_uploaded_container_is_canonical() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("answer.wav");
    // 44.1 kHz stereo input must arrive as 16 kHz mono
    let mono = tone(44100, 1.0, 440.0, 16000.0);
    let stereo: Vec<i16> = mono.iter().flat_map(|&s| [s, s]).collect();
    fs::write(&path, wav_bytes(44100, 2, &stereo)?)?;

    let recognizer = RecordingRecognizer::default();
    let mut controller = AnswerController::new(
        FileCapture::new(&path),
        recognizer.clone(),
        RecordingLimits::default(),
    );

    controller.start_recording().await?;
    controller.finish_and_submit().await?;

    let received = recognizer.received.lock().unwrap().clone();
    assert_eq!(received.len(), 1);

    let container = PcmContainer::from_bytes(received[0].clone())?;
    assert_eq!(container.header().channels, 1);
    assert_eq!(container.header().sample_rate, 16000);
    assert_eq!(container.num_samples(), 16000);

    Ok(())
}

#[tokio::test]
async fn test_silent_recording_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("silence.wav");
    fs::write(&path, wav_bytes(16000, 1, &vec![0i16; 16000])?)?;

    let mut controller = AnswerController::new(
        FileCapture::new(&path),
        RecordingRecognizer::default(),
        RecordingLimits::default(),
    );

    controller.start_recording().await?;
    let result = controller.finish_and_submit().await;

    assert!(matches!(
        result,
        Err(AnswerError::Rejected(RecordingRejected::TooQuiet { peak: 0, .. }))
    ));
    assert_eq!(controller.state(), AnswerState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_recognition_failure_returns_to_idle() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("answer.wav");
    fs::write(&path, spoken_answer_wav()?)?;

    let mut controller = AnswerController::new(
        FileCapture::new(&path),
        FailingRecognizer,
        RecordingLimits::default(),
    );

    controller.start_recording().await?;
    let result = controller.finish_and_submit().await;

    assert!(matches!(
        result,
        Err(AnswerError::Recognition(RecognitionError::Rejected(_)))
    ));
    assert_eq!(controller.state(), AnswerState::Idle);

    Ok(())
}

#[tokio::test]
async fn test_missing_recording_file() -> Result<()> {
    let mut controller = AnswerController::new(
        FileCapture::new("/nonexistent/answer.wav"),
        RecordingRecognizer::default(),
        RecordingLimits::default(),
    );

    controller.start_recording().await?;
    let result = controller.finish_and_submit().await;

    assert!(matches!(result, Err(AnswerError::Capture(_))));
    assert_eq!(controller.state(), AnswerState::Idle);

    Ok(())
}

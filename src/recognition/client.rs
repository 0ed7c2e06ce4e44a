use std::time::Duration;

use reqwest::multipart::{Form, Part};
use tracing::{info, warn};

use super::messages::{Recognition, RecognitionResponse};
use crate::audio::PcmContainer;
use crate::config::RecognitionConfig;
use crate::error::RecognitionError;

/// Multipart field the service reads the recording from
pub const UPLOAD_FIELD: &str = "file";
pub const UPLOAD_FILE_NAME: &str = "recording.wav";
pub const WAV_MIME: &str = "audio/wav";

/// Turns an encoded recording into text
#[async_trait::async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, container: &PcmContainer) -> Result<Recognition, RecognitionError>;
}

/// HTTP client for the remote speech-recognition endpoint
pub struct RecognitionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RecognitionClient {
    pub fn new(config: &RecognitionConfig) -> Result<Self, RecognitionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        info!(
            "Recognition client for {} (timeout {}s)",
            config.endpoint, config.timeout_secs
        );

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl Recognizer for RecognitionClient {
    async fn recognize(&self, container: &PcmContainer) -> Result<Recognition, RecognitionError> {
        let part = Part::bytes(container.as_bytes().to_vec())
            .file_name(UPLOAD_FILE_NAME)
            .mime_str(WAV_MIME)?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        info!(
            "Uploading {} bytes ({:.2}s) to {}",
            container.byte_len(),
            container.duration_secs(),
            self.endpoint
        );

        let response = self.http.post(&self.endpoint).multipart(form).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        let recognition = interpret_response(status, &body)?;
        info!(
            "Recognized {:?} (confidence {:.2})",
            recognition.text, recognition.confidence
        );

        Ok(recognition)
    }
}

/// Map a status code and body onto the recognition outcome
pub fn interpret_response(status: u16, body: &[u8]) -> Result<Recognition, RecognitionError> {
    let parsed = serde_json::from_slice::<RecognitionResponse>(body);

    if !(200..300).contains(&status) {
        let message = match parsed {
            Ok(RecognitionResponse {
                error: Some(error), ..
            }) => error.message,
            _ if body.is_empty() => format!("HTTP {}", status),
            _ => String::from_utf8_lossy(body).into_owned(),
        };
        warn!("Recognition service returned {}: {}", status, message);
        return Err(RecognitionError::Status { status, message });
    }

    let response = parsed.map_err(|e| RecognitionError::InvalidResponse(e.to_string()))?;

    if !response.success {
        let message = response
            .error
            .map(|e| e.message)
            .unwrap_or_else(|| "recognition failed".to_string());
        return Err(RecognitionError::Rejected(message));
    }

    response.data.ok_or(RecognitionError::MissingData)
}

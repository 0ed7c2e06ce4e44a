use super::errors::ApiError;
use super::state::AppState;
use crate::audio::{AudioEncoder, RawAudioInput};
use crate::recognition::client::UPLOAD_FIELD;
use axum::{
    extract::{Multipart, State},
    http::Uri,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Seconds since the Unix epoch
    pub timestamp: f64,
}

#[derive(Debug, Serialize)]
pub struct SpeechResponse {
    pub success: bool,
    pub data: SpeechResult,
}

#[derive(Debug, Serialize)]
pub struct SpeechResult {
    pub text: String,
    pub confidence: f32,
    /// Seconds of audio that were analysed
    pub duration: f64,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().timestamp_millis() as f64 / 1000.0,
    })
}

/// POST /api/speech
/// Encode an uploaded recording, check it and pass it to the recognizer
pub async fn process_speech(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SpeechResponse>, ApiError> {
    let upload = read_upload(multipart).await?;
    info!(
        "Received recording: {} bytes ({})",
        upload.len(),
        upload.media_type()
    );

    let container = tokio::task::spawn_blocking(move || AudioEncoder::encode(&upload))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let analysis = state.limits.analyze(&container);
    state.limits.validate(&analysis)?;

    let recognition = state.recognizer.recognize(&container).await?;
    info!(
        "Recognized {:?} (confidence {:.2})",
        recognition.text, recognition.confidence
    );

    Ok(Json(SpeechResponse {
        success: true,
        data: SpeechResult {
            text: recognition.text,
            confidence: recognition.confidence,
            duration: analysis.duration_secs,
        },
    }))
}

/// Fallback for unknown routes
pub async fn not_found(uri: Uri) -> ApiError {
    warn!("404 Not Found: {}", uri);
    ApiError::NotFound(uri.path().to_string())
}

async fn read_upload(mut multipart: Multipart) -> Result<RawAudioInput, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::AudioProcessing(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let media_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::AudioProcessing(format!("Failed to read upload: {}", e)))?;

        return Ok(RawAudioInput::new(bytes.to_vec(), media_type));
    }

    Err(ApiError::AudioProcessing(format!(
        "Missing '{}' field in upload",
        UPLOAD_FIELD
    )))
}

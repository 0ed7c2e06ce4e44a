use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::error::{DecodeError, RecognitionError, RecordingRejected};

/// Failures reported to API clients
#[derive(Debug)]
pub enum ApiError {
    InvalidAudioFormat(DecodeError),
    AudioTooLong(RecordingRejected),
    AudioProcessing(String),
    Recognition(RecognitionError),
    RateLimited,
    NotFound(String),
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub status: u16,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidAudioFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::AudioTooLong(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::AudioProcessing(_) => StatusCode::BAD_REQUEST,
            ApiError::Recognition(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidAudioFormat(_) => "INVALID_AUDIO_FORMAT",
            ApiError::AudioTooLong(_) => "AUDIO_TOO_LONG",
            ApiError::AudioProcessing(_) => "AUDIO_PROCESSING_ERROR",
            ApiError::Recognition(_) => "SPEECH_RECOGNITION_ERROR",
            ApiError::RateLimited => "RATE_LIMIT_EXCEEDED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::InvalidAudioFormat(e) => format!("Invalid audio format: {}", e),
            ApiError::AudioTooLong(e) => e.to_string(),
            ApiError::AudioProcessing(msg) => msg.clone(),
            ApiError::Recognition(e) => e.to_string(),
            ApiError::RateLimited => "Too many requests, try again later".to_string(),
            ApiError::NotFound(path) => format!("Endpoint not found: {}", path),
            ApiError::Internal(_) => "Internal error, please try again".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.code(),
                message: self.message(),
                status: status.as_u16(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DecodeError> for ApiError {
    fn from(err: DecodeError) -> Self {
        match err {
            DecodeError::NoAudio => ApiError::AudioProcessing(err.to_string()),
            other => ApiError::InvalidAudioFormat(other),
        }
    }
}

impl From<RecordingRejected> for ApiError {
    fn from(err: RecordingRejected) -> Self {
        match err {
            RecordingRejected::TooLong { .. } => ApiError::AudioTooLong(err),
            other => ApiError::AudioProcessing(other.to_string()),
        }
    }
}

impl From<RecognitionError> for ApiError {
    fn from(err: RecognitionError) -> Self {
        ApiError::Recognition(err)
    }
}

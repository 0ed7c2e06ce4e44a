use serde::{Deserialize, Serialize};

/// Recognized text returned by the speech service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub text: String,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f32,
}

/// Response body of the speech service
#[derive(Debug, Serialize, Deserialize)]
pub struct RecognitionResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Recognition>,
    #[serde(default)]
    pub error: Option<RecognitionFailure>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecognitionFailure {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

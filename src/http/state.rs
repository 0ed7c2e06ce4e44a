use std::sync::Arc;
use std::time::Duration;

use super::rate_limit::RateLimiter;
use crate::audio::RecordingLimits;
use crate::config::RateLimitConfig;
use crate::recognition::Recognizer;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Upstream speech recognition
    pub recognizer: Arc<dyn Recognizer>,

    /// Acceptance thresholds for uploaded recordings
    pub limits: RecordingLimits,

    pub rate_limiter: Arc<RateLimiter>,

    /// Largest accepted request body in bytes
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(
        recognizer: Arc<dyn Recognizer>,
        limits: RecordingLimits,
        rate_limit: &RateLimitConfig,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            recognizer,
            limits,
            rate_limiter: Arc::new(RateLimiter::new(
                rate_limit.max_requests,
                Duration::from_secs(rate_limit.window_secs),
            )),
            max_upload_bytes,
        }
    }
}

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::audio::RecordingLimits;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
    /// Largest accepted upload in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionConfig {
    /// URL of the speech-recognition endpoint
    pub endpoint: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RecognitionConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AudioConfig {
    #[serde(default)]
    pub limits: RecordingLimits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per client within one window
    pub max_requests: usize,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window_secs: 60,
        }
    }
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_timeout_secs() -> u64 {
    30
}

impl Config {
    /// Whether `path` names a config file, with or without its `.toml` extension
    pub fn exists(path: &str) -> bool {
        let path = Path::new(path);
        path.is_file() || path.with_extension("toml").is_file()
    }

    /// Load `path` (extension optional) with `QUIZ_VOICE_*` environment overrides,
    /// e.g. `QUIZ_VOICE_RECOGNITION__ENDPOINT`.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("QUIZ_VOICE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read config {}", path))?;

        settings
            .try_deserialize()
            .context("Invalid configuration")
    }

    /// Recording limits from `path`, or the defaults when there is no such file
    pub fn limits(path: &str) -> Result<RecordingLimits> {
        if Self::exists(path) {
            return Ok(Self::load(path)?.audio.limits);
        }
        info!("No config at {}, using default recording limits", path);
        Ok(RecordingLimits::default())
    }

    /// Settings for a one-off recognition run. `endpoint` replaces only the
    /// configured endpoint; it stands alone when there is no config file.
    pub fn for_recognition(
        path: &str,
        endpoint: Option<String>,
    ) -> Result<(RecognitionConfig, RecordingLimits)> {
        match endpoint {
            Some(endpoint) if !Self::exists(path) => {
                info!("No config at {}, using default recording limits", path);
                Ok((RecognitionConfig::new(endpoint), RecordingLimits::default()))
            }
            endpoint => {
                let cfg = Self::load(path)?;
                let mut recognition = cfg.recognition;
                if let Some(endpoint) = endpoint {
                    recognition.endpoint = endpoint;
                }
                Ok((recognition, cfg.audio.limits))
            }
        }
    }
}

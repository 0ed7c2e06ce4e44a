use std::path::PathBuf;

use tracing::info;

use super::input::{media_type_for_path, RawAudioInput};
use crate::error::CaptureError;

/// Identifies one in-flight capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaptureHandle(u64);

/// Audio capture backend trait
///
/// A capture is started with [`begin`](CaptureBackend::begin) and ends with
/// [`finish`](CaptureBackend::finish), which yields the whole recording at
/// once. Only one capture may be in flight per backend.
///
/// Implementations:
/// - File: hand back a recording already on disk (CLI, batch processing)
/// - Memory: hand back bytes supplied up front (tests, uploads)
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    async fn begin(&mut self) -> Result<CaptureHandle, CaptureError>;

    /// Stop capturing and return the accumulated recording
    async fn finish(&mut self, handle: CaptureHandle) -> Result<RawAudioInput, CaptureError>;

    /// Check if a capture is in flight
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Handle bookkeeping shared by the backends
#[derive(Debug, Default)]
struct InFlight {
    current: Option<CaptureHandle>,
    issued: u64,
}

impl InFlight {
    fn begin(&mut self) -> Result<CaptureHandle, CaptureError> {
        if self.current.is_some() {
            return Err(CaptureError::AlreadyCapturing);
        }
        self.issued += 1;
        let handle = CaptureHandle(self.issued);
        self.current = Some(handle);
        Ok(handle)
    }

    fn finish(&mut self, handle: CaptureHandle) -> Result<(), CaptureError> {
        match self.current {
            None => Err(CaptureError::NotCapturing),
            Some(current) if current != handle => Err(CaptureError::StaleHandle),
            Some(_) => {
                self.current = None;
                Ok(())
            }
        }
    }
}

/// Serves a recording stored on disk
pub struct FileCapture {
    path: PathBuf,
    in_flight: InFlight,
}

impl FileCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            in_flight: InFlight::default(),
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileCapture {
    async fn begin(&mut self) -> Result<CaptureHandle, CaptureError> {
        let handle = self.in_flight.begin()?;
        info!("Capturing from file: {}", self.path.display());
        Ok(handle)
    }

    async fn finish(&mut self, handle: CaptureHandle) -> Result<RawAudioInput, CaptureError> {
        self.in_flight.finish(handle)?;

        let bytes = tokio::fs::read(&self.path).await?;
        info!("Captured {} bytes from {}", bytes.len(), self.path.display());

        Ok(RawAudioInput::new(bytes, media_type_for_path(&self.path)))
    }

    fn is_capturing(&self) -> bool {
        self.in_flight.current.is_some()
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Serves a recording supplied up front
pub struct MemoryCapture {
    recording: RawAudioInput,
    in_flight: InFlight,
}

impl MemoryCapture {
    pub fn new(recording: RawAudioInput) -> Self {
        Self {
            recording,
            in_flight: InFlight::default(),
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MemoryCapture {
    async fn begin(&mut self) -> Result<CaptureHandle, CaptureError> {
        self.in_flight.begin()
    }

    async fn finish(&mut self, handle: CaptureHandle) -> Result<RawAudioInput, CaptureError> {
        self.in_flight.finish(handle)?;
        Ok(self.recording.clone())
    }

    fn is_capturing(&self) -> bool {
        self.in_flight.current.is_some()
    }

    fn name(&self) -> &str {
        "memory"
    }
}

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader};
use std::path::Path;
use tracing::info;

use super::analysis::RecordingAnalysis;
use super::container::{BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE};

/// A 16-bit integer WAV file read from disk
pub struct WavFile {
    pub path: String,
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Interleaved samples
    pub samples: Vec<i16>,
}

impl WavFile {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening WAV file: {}", path.display());

        let reader = WavReader::open(path).context("Failed to open WAV file")?;

        let spec = reader.spec();
        if spec.sample_format != SampleFormat::Int || spec.bits_per_sample > 16 {
            anyhow::bail!(
                "Only integer WAV up to 16 bits is supported, got {:?} {}-bit",
                spec.sample_format,
                spec.bits_per_sample
            );
        }

        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds =
            samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        info!(
            "WAV file loaded: {:.2}s, {}Hz, {} channels, {} samples",
            duration_seconds,
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        Ok(Self {
            path: path.display().to_string(),
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            samples,
        })
    }

    /// Whether the file already has the layout the encoder produces
    pub fn is_canonical(&self) -> bool {
        self.sample_rate == SAMPLE_RATE
            && self.channels == CHANNELS
            && self.bits_per_sample == BITS_PER_SAMPLE
    }

    /// Samples of channel 0
    pub fn first_channel(&self) -> Vec<i16> {
        self.samples
            .iter()
            .step_by(self.channels.max(1) as usize)
            .copied()
            .collect()
    }

    pub fn analyze(&self, window_secs: f64) -> RecordingAnalysis {
        RecordingAnalysis::from_samples(&self.first_channel(), self.sample_rate, window_secs)
    }
}

//! Loudness and length checks applied before a recording is sent off

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::container::PcmContainer;
use crate::error::RecordingRejected;

/// Measurements of one recording
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RecordingAnalysis {
    /// Length of the whole recording
    pub total_duration_secs: f64,
    /// Length of the analysed window (at most `analysis_window_secs`)
    pub duration_secs: f64,
    /// Largest absolute sample value in the window
    pub peak_amplitude: u16,
    /// Mean of squared sample values in the window
    pub mean_energy: f64,
    pub rms: f64,
    pub sample_rate: u32,
}

impl RecordingAnalysis {
    pub fn of(container: &PcmContainer, window_secs: f64) -> Self {
        let samples: Vec<i16> = container.samples().collect();
        Self::from_samples(&samples, container.header().sample_rate, window_secs)
    }

    /// Measure mono samples, looking only at the first `window_secs`
    pub fn from_samples(samples: &[i16], sample_rate: u32, window_secs: f64) -> Self {
        let rate = f64::from(sample_rate.max(1));
        let cutoff = ((window_secs.max(0.0) * rate) as usize).min(samples.len());
        let window = &samples[..cutoff];

        let peak_amplitude = window
            .iter()
            .map(|s| s.unsigned_abs())
            .max()
            .unwrap_or(0);

        let mean_energy = if window.is_empty() {
            0.0
        } else {
            window
                .iter()
                .map(|&s| {
                    let s = f64::from(s);
                    s * s
                })
                .sum::<f64>()
                / window.len() as f64
        };

        Self {
            total_duration_secs: samples.len() as f64 / rate,
            duration_secs: cutoff as f64 / rate,
            peak_amplitude,
            mean_energy,
            rms: mean_energy.sqrt(),
            sample_rate,
        }
    }

    pub fn is_silence(&self, rms_threshold: f64) -> bool {
        self.rms < rms_threshold
    }
}

/// Acceptance thresholds for a voice answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingLimits {
    pub max_duration_secs: f64,
    pub min_duration_secs: f64,
    /// Only the start of a recording is measured for loudness
    pub analysis_window_secs: f64,
    pub min_peak: u16,
    pub min_energy: f64,
    pub silence_rms: f64,
}

impl Default for RecordingLimits {
    fn default() -> Self {
        Self {
            max_duration_secs: 6.0,
            min_duration_secs: 0.1,
            analysis_window_secs: 5.0,
            min_peak: 100,
            min_energy: 1000.0,
            silence_rms: 500.0,
        }
    }
}

impl RecordingLimits {
    pub fn analyze(&self, container: &PcmContainer) -> RecordingAnalysis {
        RecordingAnalysis::of(container, self.analysis_window_secs)
    }

    /// Checks length first, then peak, then energy
    pub fn validate(&self, analysis: &RecordingAnalysis) -> Result<(), RecordingRejected> {
        if analysis.total_duration_secs > self.max_duration_secs {
            warn!("Recording too long: {:.2}s", analysis.total_duration_secs);
            return Err(RecordingRejected::TooLong {
                duration_secs: analysis.total_duration_secs,
                max_secs: self.max_duration_secs,
            });
        }

        if analysis.duration_secs < self.min_duration_secs {
            warn!("Recording too short: {:.2}s", analysis.duration_secs);
            return Err(RecordingRejected::TooShort {
                duration_secs: analysis.duration_secs,
                min_secs: self.min_duration_secs,
            });
        }

        if analysis.peak_amplitude < self.min_peak {
            warn!("Recording amplitude too low: {}", analysis.peak_amplitude);
            return Err(RecordingRejected::TooQuiet {
                peak: analysis.peak_amplitude,
                min_peak: self.min_peak,
            });
        }

        if analysis.mean_energy < self.min_energy {
            warn!("Recording energy too low: {:.1}", analysis.mean_energy);
            return Err(RecordingRejected::NoSpeech {
                energy: analysis.mean_energy,
                min_energy: self.min_energy,
            });
        }

        info!(
            "Recording accepted: {:.2}s, peak {}, energy {:.1}",
            analysis.duration_secs, analysis.peak_amplitude, analysis.mean_energy
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_wave(amplitude: i16, len: usize) -> Vec<i16> {
        (0..len)
            .map(|i| if i % 2 == 0 { amplitude } else { -amplitude })
            .collect()
    }

    #[test]
    fn test_metrics_of_square_wave() {
        let analysis = RecordingAnalysis::from_samples(&square_wave(1000, 16000), 16000, 5.0);

        assert_eq!(analysis.peak_amplitude, 1000);
        assert!((analysis.mean_energy - 1_000_000.0).abs() < 1e-6);
        assert!((analysis.rms - 1000.0).abs() < 1e-9);
        assert!((analysis.duration_secs - 1.0).abs() < 1e-9);
        assert!(!analysis.is_silence(500.0));
    }

    #[test]
    fn test_peak_of_most_negative_sample() {
        let analysis = RecordingAnalysis::from_samples(&[0, i16::MIN, 5], 16000, 5.0);
        assert_eq!(analysis.peak_amplitude, 32768);
    }

    #[test]
    fn test_window_limits_measurement() {
        // 1s loud followed by 6s of silence; the window only sees 2s
        let mut samples = square_wave(8000, 16000);
        samples.extend(std::iter::repeat(0).take(16000 * 6));

        let analysis = RecordingAnalysis::from_samples(&samples, 16000, 2.0);
        assert!((analysis.total_duration_secs - 7.0).abs() < 1e-9);
        assert!((analysis.duration_secs - 2.0).abs() < 1e-9);
        assert!((analysis.mean_energy - 32_000_000.0).abs() < 1e-3);
    }

    #[test]
    fn test_empty_recording() {
        let analysis = RecordingAnalysis::from_samples(&[], 16000, 5.0);
        assert_eq!(analysis.peak_amplitude, 0);
        assert_eq!(analysis.mean_energy, 0.0);
        assert!(analysis.is_silence(500.0));
    }

    #[test]
    fn test_validate_accepts_normal_speech() {
        let limits = RecordingLimits::default();
        let analysis = RecordingAnalysis::from_samples(&square_wave(4000, 24000), 16000, 5.0);
        assert_eq!(limits.validate(&analysis), Ok(()));
    }

    #[test]
    fn test_validate_rejects_too_long_before_anything_else() {
        let limits = RecordingLimits::default();
        // Silent as well as too long: length wins
        let analysis = RecordingAnalysis::from_samples(&vec![0; 16000 * 7], 16000, 5.0);

        assert!(matches!(
            limits.validate(&analysis),
            Err(RecordingRejected::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_too_short() {
        let limits = RecordingLimits::default();
        let analysis = RecordingAnalysis::from_samples(&square_wave(4000, 800), 16000, 5.0);

        assert!(matches!(
            limits.validate(&analysis),
            Err(RecordingRejected::TooShort { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_quiet_recording() {
        let limits = RecordingLimits::default();
        let analysis = RecordingAnalysis::from_samples(&square_wave(50, 16000), 16000, 5.0);

        assert_eq!(
            limits.validate(&analysis),
            Err(RecordingRejected::TooQuiet {
                peak: 50,
                min_peak: 100
            })
        );
    }

    #[test]
    fn test_validate_rejects_low_energy() {
        let limits = RecordingLimits::default();
        // A single click: loud peak, almost no energy
        let mut samples = vec![0i16; 16000];
        samples[100] = 2000;
        let analysis = RecordingAnalysis::from_samples(&samples, 16000, 5.0);

        assert!(matches!(
            limits.validate(&analysis),
            Err(RecordingRejected::NoSpeech { .. })
        ));
    }
}

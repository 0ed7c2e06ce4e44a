//! Recording → canonical mono 16 kHz 16-bit PCM WAV
//!
//! Only channel 0 of the decoded signal is kept; other channels are dropped
//! rather than averaged.

use super::container::{PcmContainer, SAMPLE_RATE};
use super::decode;
use super::input::{DecodedAudio, RawAudioInput};
use crate::error::DecodeError;

/// Scale applied to negative samples
const NEGATIVE_SCALE: f64 = 32768.0;
/// Scale applied to zero and positive samples
const POSITIVE_SCALE: f64 = 32767.0;

pub struct AudioEncoder;

impl AudioEncoder {
    /// Decode a captured recording and encode it as a PCM container
    pub fn encode(raw: &RawAudioInput) -> Result<PcmContainer, DecodeError> {
        let decoded = decode::decode(raw, SAMPLE_RATE)?;
        Ok(Self::encode_decoded(&decoded))
    }

    /// Encode channel 0 of an already decoded signal.
    ///
    /// Writes exactly one 16-bit sample per input frame whatever the
    /// signal's own rate; callers wanting a truthful header deliver the
    /// signal at 16 kHz, as [`AudioEncoder::encode`] does.
    pub fn encode_decoded(audio: &DecodedAudio) -> PcmContainer {
        let source = audio.channel(0).unwrap_or_default();
        let samples: Vec<i16> = source.iter().copied().map(quantize).collect();
        PcmContainer::from_samples(&samples)
    }
}

/// Convert one floating-point sample to a signed 16-bit value.
///
/// The sample is clamped to [-1, 1]; negatives scale by 32768 and the rest
/// by 32767, truncating toward zero. NaN maps to 0 and infinities clamp to
/// the matching bound.
pub fn quantize(sample: f32) -> i16 {
    if sample.is_nan() {
        return 0;
    }

    let clamped = f64::from(sample).clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * NEGATIVE_SCALE) as i16
    } else {
        (clamped * POSITIVE_SCALE) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::container::HEADER_LEN;

    fn mono(samples: Vec<f32>) -> DecodedAudio {
        DecodedAudio::mono(SAMPLE_RATE, samples).unwrap()
    }

    #[test]
    fn test_quantize_boundaries() {
        assert_eq!(quantize(0.0), 0);
        assert_eq!(quantize(-0.0), 0);
        assert_eq!(quantize(1.0), 32767);
        assert_eq!(quantize(-1.0), -32768);
    }

    #[test]
    fn test_quantize_clamps_out_of_range() {
        assert_eq!(quantize(2.0), 32767);
        assert_eq!(quantize(-5.0), -32768);
        assert_eq!(quantize(f32::MAX), 32767);
        assert_eq!(quantize(f32::MIN), -32768);
    }

    #[test]
    fn test_quantize_non_finite() {
        assert_eq!(quantize(f32::NAN), 0);
        assert_eq!(quantize(f32::INFINITY), 32767);
        assert_eq!(quantize(f32::NEG_INFINITY), -32768);
    }

    #[test]
    fn test_quantize_truncates_toward_zero() {
        // 0.5 * 32767 = 16383.5, -0.5 * 32768 = -16384
        assert_eq!(quantize(0.5), 16383);
        assert_eq!(quantize(-0.5), -16384);
        // -0.00001 * 32768 = -0.32768
        assert_eq!(quantize(-0.00001), 0);
    }

    #[test]
    fn test_output_length() {
        for n in [0usize, 1, 2, 17, 1000] {
            let container = AudioEncoder::encode_decoded(&mono(vec![0.25; n]));
            assert_eq!(container.byte_len(), HEADER_LEN + 2 * n);
            assert_eq!(container.num_samples(), n);
        }
    }

    #[test]
    fn test_one_second_of_silence() {
        let container = AudioEncoder::encode_decoded(&mono(vec![0.0; 16000]));
        let bytes = container.as_bytes();

        assert_eq!(bytes.len(), 32044);
        assert_eq!(u32::from_le_bytes(bytes[40..44].try_into().unwrap()), 32000);
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 32036);
        assert!(bytes[44..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_only_first_channel_is_encoded() {
        let audio = DecodedAudio::new(SAMPLE_RATE, vec![vec![1.0, 1.0], vec![-1.0, -1.0]]).unwrap();
        let container = AudioEncoder::encode_decoded(&audio);

        assert_eq!(container.samples().collect::<Vec<_>>(), vec![32767, 32767]);
    }

    #[test]
    fn test_rate_of_signal_does_not_change_length() {
        let audio = DecodedAudio::mono(44100, vec![0.1; 441]).unwrap();
        let container = AudioEncoder::encode_decoded(&audio);

        assert_eq!(container.num_samples(), 441);
        assert_eq!(container.header().sample_rate, SAMPLE_RATE);
    }

    #[test]
    fn test_encoding_is_deterministic() {
        let audio = mono((0..500).map(|i| ((i as f32) * 0.013).sin()).collect());
        let first = AudioEncoder::encode_decoded(&audio);
        let second = AudioEncoder::encode_decoded(&audio);

        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_encode_rejects_empty_input() {
        let raw = RawAudioInput::new(Vec::new(), "audio/webm");
        assert!(matches!(AudioEncoder::encode(&raw), Err(DecodeError::Empty)));
    }

    #[test]
    fn test_encode_rejects_recording_without_frames() {
        let raw = RawAudioInput::new(PcmContainer::from_samples(&[]).into_bytes(), "audio/wav");
        assert!(matches!(AudioEncoder::encode(&raw), Err(DecodeError::NoAudio)));
    }

    #[test]
    fn test_encode_rejects_non_audio_bytes() {
        let raw = RawAudioInput::new(b"this is not audio at all".to_vec(), "audio/wav");
        assert!(AudioEncoder::encode(&raw).is_err());
    }
}

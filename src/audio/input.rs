use std::path::Path;

use crate::error::DecodeError;

/// A captured recording exactly as the capture facility produced it.
///
/// The media type is only a hint for the decoder; the bytes are probed
/// regardless of what it says.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAudioInput {
    bytes: Vec<u8>,
    media_type: String,
}

impl RawAudioInput {
    pub fn new(bytes: impl Into<Vec<u8>>, media_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            media_type: media_type.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Media type without parameters, e.g. `audio/webm` for `audio/webm;codecs=opus`
    pub fn essence(&self) -> &str {
        self.media_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
    }

    /// File extension the decoder can use as a probe hint
    pub fn extension_hint(&self) -> Option<&'static str> {
        let ext = match self.essence().to_ascii_lowercase().as_str() {
            "audio/wav" | "audio/x-wav" | "audio/wave" | "audio/vnd.wave" => "wav",
            "audio/webm" | "video/webm" => "webm",
            "audio/ogg" | "application/ogg" => "ogg",
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" => "m4a",
            "audio/aac" => "aac",
            "audio/flac" | "audio/x-flac" => "flac",
            "audio/aiff" | "audio/x-aiff" => "aiff",
            _ => return None,
        };
        Some(ext)
    }
}

/// Media type for a recording on disk, judged by its extension
pub fn media_type_for_path(path: impl AsRef<Path>) -> &'static str {
    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("wav") | Some("wave") => "audio/wav",
        Some("webm") => "audio/webm",
        Some("ogg") | Some("oga") => "audio/ogg",
        Some("mp3") => "audio/mpeg",
        Some("m4a") | Some("mp4") => "audio/mp4",
        Some("aac") => "audio/aac",
        Some("flac") => "audio/flac",
        Some("aif") | Some("aiff") => "audio/aiff",
        _ => "application/octet-stream",
    }
}

/// Planar floating-point samples produced by decoding a recording
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl DecodedAudio {
    /// All channels must have the same length and the rate must be non-zero.
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self, DecodeError> {
        if sample_rate == 0 {
            return Err(DecodeError::InvalidSignal("sample rate is zero".into()));
        }

        let first_len = match channels.first() {
            Some(first) => first.len(),
            None => return Err(DecodeError::InvalidSignal("no channels".into())),
        };

        if let Some((index, channel)) = channels
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != first_len)
        {
            return Err(DecodeError::InvalidSignal(format!(
                "channel {} has {} frames, channel 0 has {}",
                index,
                channel.len(),
                first_len
            )));
        }

        Ok(Self {
            sample_rate,
            channels,
        })
    }

    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self, DecodeError> {
        Self::new(sample_rate, vec![samples])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Samples per channel
    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    pub(crate) fn into_channels(self) -> Vec<Vec<f32>> {
        self.channels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoded_audio_rejects_zero_rate() {
        let result = DecodedAudio::mono(0, vec![0.0; 4]);
        assert!(matches!(result, Err(DecodeError::InvalidSignal(_))));
    }

    #[test]
    fn test_decoded_audio_rejects_ragged_channels() {
        let result = DecodedAudio::new(16000, vec![vec![0.0; 4], vec![0.0; 3]]);
        assert!(matches!(result, Err(DecodeError::InvalidSignal(_))));
    }

    #[test]
    fn test_decoded_audio_rejects_no_channels() {
        assert!(DecodedAudio::new(16000, Vec::new()).is_err());
    }

    #[test]
    fn test_decoded_audio_duration() {
        let audio = DecodedAudio::new(8000, vec![vec![0.0; 4000], vec![0.0; 4000]]).unwrap();
        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.frames(), 4000);
        assert!((audio.duration_secs() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_media_type_parameters_are_ignored() {
        let raw = RawAudioInput::new(vec![1, 2, 3], "audio/webm;codecs=opus");
        assert_eq!(raw.essence(), "audio/webm");
        assert_eq!(raw.extension_hint(), Some("webm"));
    }

    #[test]
    fn test_unknown_media_type_has_no_hint() {
        let raw = RawAudioInput::new(vec![1], "application/octet-stream");
        assert_eq!(raw.extension_hint(), None);
    }

    #[test]
    fn test_media_type_for_path() {
        assert_eq!(media_type_for_path("answer.WAV"), "audio/wav");
        assert_eq!(media_type_for_path("answer.m4a"), "audio/mp4");
        assert_eq!(media_type_for_path("answer"), "application/octet-stream");
    }
}

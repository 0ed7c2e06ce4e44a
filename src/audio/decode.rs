use std::io::{Cursor, ErrorKind};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

use super::input::{DecodedAudio, RawAudioInput};
use super::resample::resample_linear;
use crate::error::DecodeError;

/// Decode a recording and deliver it at `target_rate`.
///
/// Every channel is resampled when the source rate differs, the same way
/// a browser audio context hands back decoded audio at its own rate.
pub fn decode(raw: &RawAudioInput, target_rate: u32) -> Result<DecodedAudio, DecodeError> {
    let native = decode_native(raw)?;
    let source_rate = native.sample_rate();

    if source_rate == target_rate {
        return Ok(native);
    }

    debug!("Resampling {}Hz -> {}Hz", source_rate, target_rate);

    let channels = native
        .into_channels()
        .iter()
        .map(|channel| resample_linear(channel, source_rate, target_rate))
        .collect();

    DecodedAudio::new(target_rate, channels)
}

/// Decode a recording at its own sample rate
pub fn decode_native(raw: &RawAudioInput) -> Result<DecodedAudio, DecodeError> {
    if raw.is_empty() {
        return Err(DecodeError::Empty);
    }

    let source = Cursor::new(raw.bytes().to_vec());
    let mss = MediaSourceStream::new(Box::new(source), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = raw.extension_hint() {
        hint.with_extension(ext);
    }
    if !raw.essence().is_empty() {
        hint.mime_type(raw.essence());
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::Unrecognized(e.to_string()))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(DecodeError::NoTrack)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnsupportedCodec(e.to_string()))?;

    let mut sample_rate = codec_params.sample_rate;
    let mut channels: Vec<Vec<f32>> = Vec::new();
    let mut skipped_packets = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let count = spec.channels.count();
                if count == 0 {
                    continue;
                }

                sample_rate.get_or_insert(spec.rate);
                if channels.is_empty() {
                    channels = vec![Vec::new(); count];
                }

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);

                for frame in buffer.samples().chunks_exact(count) {
                    for (channel, &sample) in channels.iter_mut().zip(frame) {
                        channel.push(sample);
                    }
                }
            }
            Err(SymphoniaError::DecodeError(e)) => {
                skipped_packets += 1;
                warn!("Skipping undecodable packet: {}", e);
            }
            Err(e) => return Err(DecodeError::Corrupt(e.to_string())),
        }
    }

    let frames = channels.first().map_or(0, Vec::len);
    check_frames(frames, skipped_packets)?;

    if let Some(declared) = codec_params.n_frames {
        if (frames as u64) < declared {
            warn!(
                "Stream ended early: {} of {} declared frames decoded",
                frames, declared
            );
        }
    }

    let sample_rate = sample_rate.ok_or(DecodeError::UnknownSampleRate)?;
    let audio = DecodedAudio::new(sample_rate, channels)?;

    debug!(
        "Decoded {} ({} bytes): {}Hz, {} channels, {} frames, {} packets skipped",
        raw.media_type(),
        raw.len(),
        audio.sample_rate(),
        audio.channel_count(),
        audio.frames(),
        skipped_packets
    );

    Ok(audio)
}

/// A decode that produced nothing is an error: corrupt when packets were
/// dropped along the way, otherwise simply empty.
fn check_frames(frames: usize, skipped_packets: usize) -> Result<(), DecodeError> {
    match (frames, skipped_packets) {
        (0, 0) => Err(DecodeError::NoAudio),
        (0, skipped) => Err(DecodeError::Corrupt(format!(
            "all {} packets failed to decode",
            skipped
        ))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::PcmContainer;

    fn wav(samples: &[i16]) -> RawAudioInput {
        RawAudioInput::new(PcmContainer::from_samples(samples).into_bytes(), "audio/wav")
    }

    #[test]
    fn test_decode_canonical_wav() {
        let audio = decode_native(&wav(&[0, 16384, -16384, 32767])).unwrap();

        assert_eq!(audio.sample_rate(), 16000);
        assert_eq!(audio.channel_count(), 1);
        assert_eq!(audio.frames(), 4);
        assert_eq!(audio.channel(0).unwrap()[1], 0.5);
    }

    #[test]
    fn test_zero_frame_stream_has_no_audio() {
        assert!(matches!(decode_native(&wav(&[])), Err(DecodeError::NoAudio)));
        assert!(matches!(decode(&wav(&[]), 16000), Err(DecodeError::NoAudio)));
    }

    #[test]
    fn test_truncated_stream_keeps_decoded_frames() {
        let mut bytes = PcmContainer::from_samples(&[1000; 16000]).into_bytes();
        bytes.truncate(48);

        let audio = decode_native(&RawAudioInput::new(bytes, "audio/wav")).unwrap();
        assert_eq!(audio.frames(), 2);
    }

    #[test]
    fn test_nothing_decoded_after_skipped_packets_is_corrupt() {
        assert!(matches!(check_frames(0, 3), Err(DecodeError::Corrupt(_))));
        assert!(matches!(check_frames(0, 0), Err(DecodeError::NoAudio)));
        assert!(check_frames(10, 3).is_ok());
    }
}

// Shared fixtures for integration tests
//
// Recordings are generated on the fly with hound so no binary fixtures
// need to live in the repository.

#![allow(dead_code)]

use anyhow::Result;
use std::io::Cursor;

/// Write interleaved i16 samples as an in-memory WAV file
pub fn wav_bytes(sample_rate: u32, channels: u16, samples: &[i16]) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}

/// Mono sine tone, amplitude in i16 units
pub fn tone(sample_rate: u32, seconds: f32, frequency: f32, amplitude: f32) -> Vec<i16> {
    let frames = (seconds * sample_rate as f32) as usize;
    (0..frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin()) as i16
        })
        .collect()
}

/// A spoken-answer stand-in: one second of 440 Hz at half scale, 16 kHz mono WAV
pub fn spoken_answer_wav() -> Result<Vec<u8>> {
    wav_bytes(16000, 1, &tone(16000, 1.0, 440.0, 16000.0))
}

/// Read back a WAV with hound: (spec, samples)
pub fn read_wav(bytes: &[u8]) -> Result<(hound::WavSpec, Vec<i16>)> {
    let reader = hound::WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let samples = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok((spec, samples))
}

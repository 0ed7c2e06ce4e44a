//! Canonical RIFF/WAVE container for mono 16-bit linear PCM
//!
//! Layout (all integers little-endian):
//!
//! | offset | size | field            |
//! |--------|------|------------------|
//! | 0      | 4    | `"RIFF"`         |
//! | 4      | 4    | 36 + data size   |
//! | 8      | 4    | `"WAVE"`         |
//! | 12     | 4    | `"fmt "`         |
//! | 16     | 4    | 16               |
//! | 20     | 2    | 1 (linear PCM)   |
//! | 22     | 2    | channels         |
//! | 24     | 4    | sample rate      |
//! | 28     | 4    | byte rate        |
//! | 32     | 2    | block align      |
//! | 34     | 2    | bits per sample  |
//! | 36     | 4    | `"data"`         |
//! | 40     | 4    | data size        |
//! | 44     | ...  | samples          |

use tracing::warn;

use crate::error::HeaderError;

pub const HEADER_LEN: usize = 44;
pub const SAMPLE_RATE: u32 = 16_000;
pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;
pub const BYTES_PER_SAMPLE: usize = 2;
pub const PCM_FORMAT: u16 = 1;

const FMT_CHUNK_SIZE: u32 = 16;
/// Bytes of header counted by the RIFF size field besides the data itself
const RIFF_OVERHEAD: u32 = 36;

/// Largest sample count whose sizes still fit the 32-bit header fields
pub const MAX_SAMPLES: usize = ((u32::MAX - RIFF_OVERHEAD) as usize) / BYTES_PER_SAMPLE;

/// The 44-byte header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmHeader {
    pub riff_chunk_size: u32,
    pub fmt_chunk_size: u32,
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_chunk_size: u32,
}

impl PcmHeader {
    /// Header for `data_len` bytes of mono 16 kHz 16-bit samples
    pub fn for_data_len(data_len: u32) -> Self {
        let bytes_per_sample = BYTES_PER_SAMPLE as u32;
        Self {
            riff_chunk_size: RIFF_OVERHEAD + data_len,
            fmt_chunk_size: FMT_CHUNK_SIZE,
            audio_format: PCM_FORMAT,
            channels: CHANNELS,
            sample_rate: SAMPLE_RATE,
            byte_rate: SAMPLE_RATE * u32::from(CHANNELS) * bytes_per_sample,
            block_align: CHANNELS * BYTES_PER_SAMPLE as u16,
            bits_per_sample: BITS_PER_SAMPLE,
            data_chunk_size: data_len,
        }
    }

    pub fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&self.riff_chunk_size.to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&self.fmt_chunk_size.to_le_bytes());
        out.extend_from_slice(&self.audio_format.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&self.byte_rate.to_le_bytes());
        out.extend_from_slice(&self.block_align.to_le_bytes());
        out.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&self.data_chunk_size.to_le_bytes());
    }

    /// Parse and check a canonical mono 16 kHz 16-bit PCM header.
    ///
    /// Only the header is examined; size agreement with the payload is
    /// checked by [`PcmContainer::from_bytes`].
    pub fn parse(bytes: &[u8]) -> Result<Self, HeaderError> {
        if bytes.len() < HEADER_LEN {
            return Err(HeaderError::TooShort(bytes.len()));
        }

        expect_tag(bytes, 0, "RIFF")?;
        expect_tag(bytes, 8, "WAVE")?;
        expect_tag(bytes, 12, "fmt ")?;
        expect_tag(bytes, 36, "data")?;

        let header = Self {
            riff_chunk_size: read_u32(bytes, 4),
            fmt_chunk_size: read_u32(bytes, 16),
            audio_format: read_u16(bytes, 20),
            channels: read_u16(bytes, 22),
            sample_rate: read_u32(bytes, 24),
            byte_rate: read_u32(bytes, 28),
            block_align: read_u16(bytes, 32),
            bits_per_sample: read_u16(bytes, 34),
            data_chunk_size: read_u32(bytes, 40),
        };

        let canonical = Self::for_data_len(header.data_chunk_size);
        let mismatch = |what: &str, got: u32, want: u32| {
            Err(HeaderError::Unsupported(format!(
                "{} is {}, expected {}",
                what, got, want
            )))
        };

        if header.fmt_chunk_size != canonical.fmt_chunk_size {
            return mismatch("fmt chunk size", header.fmt_chunk_size, FMT_CHUNK_SIZE);
        }
        if header.audio_format != PCM_FORMAT {
            return mismatch("audio format", header.audio_format.into(), PCM_FORMAT.into());
        }
        if header.channels != CHANNELS {
            return mismatch("channel count", header.channels.into(), CHANNELS.into());
        }
        if header.sample_rate != SAMPLE_RATE {
            return mismatch("sample rate", header.sample_rate, SAMPLE_RATE);
        }
        if header.bits_per_sample != BITS_PER_SAMPLE {
            return mismatch(
                "bits per sample",
                header.bits_per_sample.into(),
                BITS_PER_SAMPLE.into(),
            );
        }
        if header.byte_rate != canonical.byte_rate {
            return mismatch("byte rate", header.byte_rate, canonical.byte_rate);
        }
        if header.block_align != canonical.block_align {
            return mismatch(
                "block align",
                header.block_align.into(),
                canonical.block_align.into(),
            );
        }

        Ok(header)
    }
}

fn expect_tag(bytes: &[u8], offset: usize, expected: &'static str) -> Result<(), HeaderError> {
    if &bytes[offset..offset + 4] == expected.as_bytes() {
        Ok(())
    } else {
        Err(HeaderError::BadTag { offset, expected })
    }
}

fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// How many of `len` samples fit the container
fn storable_samples(len: usize) -> usize {
    if len > MAX_SAMPLES {
        warn!(
            "Recording of {} samples exceeds the WAV size limit, keeping the first {}",
            len, MAX_SAMPLES
        );
        return MAX_SAMPLES;
    }
    len
}

/// An encoded recording: header followed by little-endian i16 samples.
///
/// The header's size fields always agree with the payload length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmContainer {
    header: PcmHeader,
    bytes: Vec<u8>,
}

impl PcmContainer {
    /// Build a container from quantized samples
    ///
    /// Input beyond [`MAX_SAMPLES`] cannot be described by the header and is
    /// dropped with a warning.
    pub fn from_samples(samples: &[i16]) -> Self {
        let samples = &samples[..storable_samples(samples.len())];
        let data_len = (samples.len() * BYTES_PER_SAMPLE) as u32;
        let header = PcmHeader::for_data_len(data_len);

        let mut bytes = Vec::with_capacity(HEADER_LEN + data_len as usize);
        header.write(&mut bytes);
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }

        Self { header, bytes }
    }

    /// Adopt bytes produced elsewhere, checking header and sizes
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, HeaderError> {
        let header = PcmHeader::parse(&bytes)?;
        let actual = (bytes.len() - HEADER_LEN) as u32;

        if header.data_chunk_size != actual {
            return Err(HeaderError::SizeMismatch {
                field: "data chunk",
                declared: header.data_chunk_size,
                actual,
            });
        }
        if header.riff_chunk_size != RIFF_OVERHEAD + actual {
            return Err(HeaderError::SizeMismatch {
                field: "RIFF chunk",
                declared: header.riff_chunk_size,
                actual: RIFF_OVERHEAD + actual,
            });
        }

        Ok(Self { header, bytes })
    }

    pub fn header(&self) -> &PcmHeader {
        &self.header
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Total size including the header
    pub fn byte_len(&self) -> usize {
        self.bytes.len()
    }

    /// Sample payload without the header
    pub fn data(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..]
    }

    pub fn num_samples(&self) -> usize {
        self.data().len() / BYTES_PER_SAMPLE
    }

    pub fn samples(&self) -> impl Iterator<Item = i16> + '_ {
        self.data()
            .chunks_exact(BYTES_PER_SAMPLE)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
    }

    pub fn duration_secs(&self) -> f64 {
        self.num_samples() as f64 / f64::from(self.header.sample_rate)
    }
}

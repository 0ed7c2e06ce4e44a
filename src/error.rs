use thiserror::Error;

use crate::answer::AnswerState;

/// A recording could not be turned into audio samples
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("recording is empty")]
    Empty,

    #[error("unrecognized audio container: {0}")]
    Unrecognized(String),

    #[error("no decodable audio track found")]
    NoTrack,

    #[error("audio track does not declare a sample rate")]
    UnknownSampleRate,

    #[error("unsupported codec: {0}")]
    UnsupportedCodec(String),

    #[error("recording contains no audio")]
    NoAudio,

    #[error("corrupt audio stream: {0}")]
    Corrupt(String),

    #[error("invalid decoded signal: {0}")]
    InvalidSignal(String),
}

/// Bytes that do not form a canonical mono 16-bit PCM container
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HeaderError {
    #[error("container is {0} bytes, shorter than the 44-byte header")]
    TooShort(usize),

    #[error("expected tag {expected:?} at offset {offset}")]
    BadTag {
        offset: usize,
        expected: &'static str,
    },

    #[error("unsupported format: {0}")]
    Unsupported(String),

    #[error("{field} declares {declared} bytes but container holds {actual}")]
    SizeMismatch {
        field: &'static str,
        declared: u32,
        actual: u32,
    },
}

/// Reasons a recording is refused before it is sent for recognition
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordingRejected {
    #[error("recording is too long: {duration_secs:.2}s (max {max_secs:.1}s)")]
    TooLong { duration_secs: f64, max_secs: f64 },

    #[error("recording is too short: {duration_secs:.2}s (min {min_secs:.1}s)")]
    TooShort { duration_secs: f64, min_secs: f64 },

    #[error("recording volume too low: peak {peak} (min {min_peak})")]
    TooQuiet { peak: u16, min_peak: u16 },

    #[error("no speech detected: energy {energy:.1} (min {min_energy:.1})")]
    NoSpeech { energy: f64, min_energy: f64 },
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("a capture is already in flight")]
    AlreadyCapturing,

    #[error("no capture is in flight")]
    NotCapturing,

    #[error("capture handle does not belong to the in-flight capture")]
    StaleHandle,

    #[error("capture I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures talking to the remote speech-recognition service
#[derive(Error, Debug)]
pub enum RecognitionError {
    #[error("recognition request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("recognition service returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("recognition rejected: {0}")]
    Rejected(String),

    #[error("recognition response carried no result")]
    MissingData,

    #[error("invalid recognition response: {0}")]
    InvalidResponse(String),
}

#[derive(Error, Debug)]
pub enum AnswerError {
    #[error("cannot start recording while {0:?}")]
    Busy(AnswerState),

    #[error("no recording in progress")]
    NotRecording,

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Rejected(#[from] RecordingRejected),

    #[error(transparent)]
    Recognition(#[from] RecognitionError),
}

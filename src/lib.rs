pub mod answer;
pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod recognition;

pub use answer::{AnswerController, AnswerState};
pub use audio::{
    AudioEncoder, CaptureBackend, DecodedAudio, FileCapture, MemoryCapture, PcmContainer,
    PcmHeader, RawAudioInput, RecordingAnalysis, RecordingLimits, WavFile,
};
pub use config::Config;
pub use error::{
    AnswerError, CaptureError, DecodeError, HeaderError, RecognitionError, RecordingRejected,
};
pub use http::{create_router, AppState};
pub use recognition::{Recognition, RecognitionClient, Recognizer};

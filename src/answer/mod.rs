//! Voice answer flow
//!
//! The `AnswerController` owns the whole lifecycle of a spoken answer:
//! - Microphone capture (one recording in flight at a time)
//! - Encoding to 16 kHz mono PCM WAV
//! - Length and loudness checks
//! - Upload to the speech-recognition service

mod controller;

pub use controller::{AnswerController, AnswerState};

pub mod client;
pub mod messages;

pub use client::{interpret_response, RecognitionClient, Recognizer};
pub use messages::{Recognition, RecognitionFailure, RecognitionResponse};

pub mod analysis;
pub mod capture;
pub mod container;
pub mod decode;
pub mod encoder;
pub mod file;
pub mod input;
pub mod resample;

pub use analysis::{RecordingAnalysis, RecordingLimits};
pub use capture::{CaptureBackend, CaptureHandle, FileCapture, MemoryCapture};
pub use container::{PcmContainer, PcmHeader};
pub use decode::{decode, decode_native};
pub use encoder::{quantize, AudioEncoder};
pub use file::WavFile;
pub use input::{media_type_for_path, DecodedAudio, RawAudioInput};

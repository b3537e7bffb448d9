pub mod transcode;
pub mod response;

pub use transcode::{FfmpegTranscoder, Transcoder, TranscodeError};
pub use response::{AudioFormat, AudioPayload};

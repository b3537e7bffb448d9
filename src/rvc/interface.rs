use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::voice::VoiceProfile;

/// One conversion handed to the external tool
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    pub input_path: PathBuf,
    /// Where the tool must write its WAV. The parent directory may not exist yet.
    pub output_path: PathBuf,
    pub profile: VoiceProfile,
}

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("RVC infer_cli.py not found in {0}")]
    EntryScriptNotFound(PathBuf),

    #[error("Failed to launch RVC process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("RVC timed out after {0} seconds")]
    TimedOut(u64),

    #[error("RVC failed with code {code}")]
    ProcessFailed { code: i32 },

    #[error("RVC didn't produce output file at {0}")]
    OutputMissing(PathBuf),

    #[error("RVC produced an empty output file at {0}")]
    OutputEmpty(PathBuf),

    #[error("I/O error during inference: {0}")]
    Io(#[from] std::io::Error),
}

/// Runs voice conversion - the production implementation shells out to RVC
///
/// On success the returned path exists and is non-empty.
#[async_trait]
pub trait InferenceRunner: Send + Sync {
    async fn convert(&self, request: &InferenceRequest) -> Result<PathBuf, InferenceError>;
}

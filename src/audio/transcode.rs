use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::TranscodeConfig;
use crate::utils::encoding::decode_text;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("Transcoding is disabled")]
    Disabled,

    #[error("Failed to run ffmpeg: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("ffmpeg failed: {0}")]
    Failed(String),

    #[error("ffmpeg timed out after {0} seconds")]
    TimedOut(u64),

    #[error("ffmpeg produced no output at {0}")]
    NoOutput(String),
}

/// WAV to MP3 conversion
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn to_mp3(&self, wav: &Path, mp3: &Path) -> Result<(), TranscodeError>;
}

pub struct FfmpegTranscoder {
    config: TranscodeConfig,
}

impl FfmpegTranscoder {
    pub fn new(config: TranscodeConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn to_mp3(&self, wav: &Path, mp3: &Path) -> Result<(), TranscodeError> {
        if !self.config.enabled {
            return Err(TranscodeError::Disabled);
        }

        debug!("Transcoding {} with {}", wav.display(), self.config.ffmpeg_path);
        let mut command = Command::new(&self.config.ffmpeg_path);
        command
            .arg("-y")
            .arg("-hide_banner")
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(wav)
            .arg("-codec:a")
            .arg("libmp3lame")
            .arg("-b:a")
            .arg(&self.config.bitrate)
            .arg(mp3)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let output = tokio::time::timeout(timeout, command.output())
            .await
            .map_err(|_| TranscodeError::TimedOut(self.config.timeout_secs))?
            .map_err(TranscodeError::Spawn)?;

        if !output.status.success() {
            let stderr = decode_text(&output.stderr);
            return Err(TranscodeError::Failed(stderr.trim().to_string()));
        }

        match tokio::fs::metadata(mp3).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(TranscodeError::NoOutput(mp3.display().to_string())),
        }
    }
}

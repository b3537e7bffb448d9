use anyhow::Context;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use std::path::Path;
use tracing::{info, warn};

use crate::error::ApiError;
use super::transcode::Transcoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::Wav => "audio/wav",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }
}

/// Converted audio ready to be sent back to the caller
#[derive(Debug, Clone)]
pub struct AudioPayload {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    pub voice: String,
}

impl AudioPayload {
    /// Transcode the raw RVC output to MP3 and load the result.
    ///
    /// A transcoding failure falls back to the untouched WAV; it never fails the request.
    pub async fn assemble(
        transcoder: &dyn Transcoder,
        wav_path: &Path,
        voice: &str,
    ) -> Result<Self, ApiError> {
        let mp3_path = wav_path.with_extension("mp3");
        let (final_path, format) = match transcoder.to_mp3(wav_path, &mp3_path).await {
            Ok(()) => {
                info!("Converted to MP3: {}", mp3_path.display());
                (mp3_path.as_path(), AudioFormat::Mp3)
            }
            Err(e) => {
                warn!("MP3 conversion failed, serving WAV: {}", e);
                (wav_path, AudioFormat::Wav)
            }
        };

        let bytes = tokio::fs::read(final_path)
            .await
            .with_context(|| format!("Output file not found: {}", final_path.display()))?;
        if bytes.is_empty() {
            return Err(ApiError::EmptyOutput);
        }
        info!("Read {} bytes from {}", bytes.len(), final_path.display());

        Ok(Self {
            bytes,
            format,
            voice: voice.to_string(),
        })
    }

    pub fn file_name(&self) -> String {
        format!("cloned_{}.{}", self.voice, self.format.extension())
    }
}

impl IntoResponse for AudioPayload {
    fn into_response(self) -> Response {
        let disposition = HeaderValue::from_str(&format!("attachment; filename={}", self.file_name()))
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
        let headers = [
            (header::CONTENT_TYPE, HeaderValue::from_static(self.format.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, HeaderValue::from(self.bytes.len())),
        ];

        (StatusCode::OK, headers, self.bytes).into_response()
    }
}

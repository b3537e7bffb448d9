use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::any::Any;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{error, warn};

use crate::rvc::InferenceError;

/// Every way a `/clone` request can fail
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No audio file provided")]
    MissingAudio,

    #[error("Uploaded audio file is empty")]
    EmptyAudio,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Invalid multipart request: {}", .0.body_text())]
    Multipart(#[from] MultipartError),

    #[error("Only {supported} voice supported")]
    UnsupportedVoice { requested: String, supported: String },

    #[error("RVC not installed")]
    RvcNotInstalled { root: PathBuf },

    #[error("RVC inference failed: {0}")]
    Inference(#[from] InferenceError),

    #[error("Output file is empty")]
    EmptyOutput,

    #[error("{0:#}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingAudio
            | ApiError::EmptyAudio
            | ApiError::InvalidUpload(_)
            | ApiError::UnsupportedVoice { .. } => StatusCode::BAD_REQUEST,
            // 400 for malformed bodies, 413 when the upload exceeds the body limit
            ApiError::Multipart(e) => e.status(),
            ApiError::RvcNotInstalled { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Inference(_) | ApiError::EmptyOutput | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = %status, "Clone request failed: {}", self);
        } else {
            warn!(status = %status, "Clone request rejected: {}", self);
        }

        let body = match &self {
            ApiError::RvcNotInstalled { root } => json!({
                "error": self.to_string(),
                "message": format!("Please install RVC in the {} directory", root.display()),
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Response for a handler that panicked outside the conversion task
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(anyhow::anyhow!("Request handler panicked: {}", detail)).into_response()
}

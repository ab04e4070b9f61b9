use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

// Invalid startup configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("sweep interval must be at least one second")]
    ZeroSweepInterval,

    #[error("max upload size must be greater than zero")]
    ZeroUploadLimit,
}

// Errors surfaced by request handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Multipart(err) => {
                tracing::warn!(error = %err, "rejected multipart body");
                (err.status(), err.body_text()).into_response()
            }
            other => {
                tracing::error!(error = %other, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

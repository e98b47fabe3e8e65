use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use flipbook_core::SniffError;
use serde_json::json;
use std::fmt;

use crate::{intake::IntakeError, transcode::TranscodeError};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unsupported_media_type(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_GATEWAY, message)
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": {
                "message": self.message,
                "status": self.status.as_u16(),
            }
        }));

        (self.status, body).into_response()
    }
}

impl From<SniffError> for AppError {
    fn from(err: SniffError) -> Self {
        match err {
            SniffError::InvalidFormat(_) => {
                Self::unsupported_media_type(err.to_string())
            }
            SniffError::MalformedInput { .. }
            | SniffError::AmbiguousParse { .. } => {
                Self::unprocessable(err.to_string())
            }
        }
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        match &err {
            IntakeError::TooLarge { .. } => Self::payload_too_large(err.to_string()),
            IntakeError::Upstream { .. } | IntakeError::Fetch(_) => {
                tracing::warn!(error = %err, "source fetch failed");
                Self::bad_gateway(err.to_string())
            }
            IntakeError::Kind(inner) => Self::from(inner.clone()),
            _ => Self::bad_request(err.to_string()),
        }
    }
}

impl From<TranscodeError> for AppError {
    fn from(err: TranscodeError) -> Self {
        match err {
            TranscodeError::Unsupported { .. } => {
                Self::unprocessable(err.to_string())
            }
            other => {
                tracing::error!(error = %other, "transcode failed");
                Self::bad_gateway(other.to_string())
            }
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(err.to_string())
    }
}

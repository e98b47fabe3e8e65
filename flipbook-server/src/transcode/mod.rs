//! Conversion backends.
//!
//! A [`Transcoder`] receives the source bytes together with the container
//! and `scale=W:H` directive the sniffer chose, and returns the encoded
//! output. Two backends exist: a local `ffmpeg` child process and a remote
//! upload-and-transform API.

pub mod ffmpeg;
pub mod signature;
pub mod upload;

use std::{fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use axum::body::Bytes;
use flipbook_config::{Config, TranscoderBackend};
use flipbook_core::{MediaKind, OutputContainer, ScaleDirective};
use serde::Serialize;
use thiserror::Error;

pub use ffmpeg::FfmpegTranscoder;
pub use upload::UploadApiTranscoder;

#[derive(Debug, Clone)]
pub struct TranscodeJob {
    pub source: Bytes,
    pub kind: MediaKind,
    pub container: OutputContainer,
    pub scale: ScaleDirective,
    pub stem: String,
}

#[derive(Debug, Clone)]
pub struct TranscodeOutput {
    pub bytes: Bytes,
    pub container: OutputContainer,
}

/// Readiness reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackendHealth {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl BackendHealth {
    pub fn ready(detail: impl Into<String>) -> Self {
        Self {
            healthy: true,
            detail: Some(detail.into()),
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self {
            healthy: false,
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("{backend} cannot perform this conversion: {reason}")]
    Unsupported {
        backend: &'static str,
        reason: String,
    },
    #[error("transcode timed out after {0:?}")]
    TimedOut(Duration),
    #[error("transcoder failed: {0}")]
    Failed(String),
    #[error("unexpected response from upload API: {0}")]
    UnexpectedResponse(String),
    #[error("transcoder I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("upload API request failed: {0}")]
    Http(#[from] reqwest::Error),
}

#[async_trait]
pub trait Transcoder: Send + Sync + fmt::Debug {
    /// Short backend name, as configured.
    fn backend(&self) -> &'static str;

    async fn health(&self) -> BackendHealth;

    async fn transcode(
        &self,
        job: TranscodeJob,
    ) -> Result<TranscodeOutput, TranscodeError>;
}

/// Builds the backend selected in configuration.
pub fn build_transcoder(
    config: &Config,
    client: reqwest::Client,
) -> anyhow::Result<Arc<dyn Transcoder>> {
    match config.transcoder.backend {
        TranscoderBackend::Ffmpeg => Ok(Arc::new(FfmpegTranscoder::new(
            config.transcoder.ffmpeg.ffmpeg_path.clone(),
            config.transcoder.timeout,
        ))),
        TranscoderBackend::Upload => {
            let upload = config.transcoder.upload.clone().ok_or_else(|| {
                anyhow::anyhow!("upload transcoder selected without credentials")
            })?;
            Ok(Arc::new(UploadApiTranscoder::new(
                client,
                upload,
                config.transcoder.timeout,
            )))
        }
    }
}
